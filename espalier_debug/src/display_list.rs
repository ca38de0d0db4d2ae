// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded draw commands.
//!
//! [`export`] writes a [`Picture`] as a JSON array with one object per
//! command. Every object carries an `"op"` field naming the command kind;
//! geometry is written as plain numbers, paths as SVG path data.

use std::io::{self, Write};

use serde_json::{Value, json};

use espalier_paint::{Color, DrawCmd, Image, Paint, Picture};
use kurbo::{Affine, Point, Rect, RoundedRect};

/// Writes `picture` as pretty-printed JSON.
pub fn export(picture: &Picture, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &to_json(picture))?;
    Ok(())
}

/// Converts `picture` to a JSON array of command objects.
#[must_use]
pub fn to_json(picture: &Picture) -> Value {
    Value::Array(picture.commands().iter().map(command).collect())
}

/// Converts one command to a JSON object.
#[must_use]
pub fn command(cmd: &DrawCmd) -> Value {
    let op = cmd.name();
    match cmd {
        DrawCmd::Save | DrawCmd::Restore | DrawCmd::ResetMatrix => json!({ "op": op }),
        DrawCmd::SaveLayer { bounds, paint } => json!({
            "op": op,
            "bounds": bounds.map(rect),
            "paint": paint_json(paint),
        }),
        DrawCmd::Translate { dx, dy } => json!({ "op": op, "dx": dx, "dy": dy }),
        DrawCmd::Scale { sx, sy } => json!({ "op": op, "sx": sx, "sy": sy }),
        DrawCmd::Rotate { radians, offset } => json!({
            "op": op,
            "radians": radians,
            "offset": offset.map(point),
        }),
        DrawCmd::Skew { sx, sy } => json!({ "op": op, "sx": sx, "sy": sy }),
        DrawCmd::Concat(m) | DrawCmd::SetMatrix(m) => json!({ "op": op, "matrix": affine(*m) }),
        DrawCmd::ClipRect(r) => json!({ "op": op, "rect": rect(*r) }),
        DrawCmd::ClipRRect(r) => json!({ "op": op, "rrect": rrect(*r) }),
        DrawCmd::ClipPath(path) => json!({
            "op": op,
            "path": path.as_bez().to_svg(),
            "fill_rule": format!("{:?}", path.fill_rule()),
        }),
        DrawCmd::DrawPath { path, paint } => json!({
            "op": op,
            "path": path.as_bez().to_svg(),
            "fill_rule": format!("{:?}", path.fill_rule()),
            "paint": paint_json(paint),
        }),
        DrawCmd::DrawImage {
            image,
            offset,
            paint,
        } => json!({
            "op": op,
            "image": image_json(image),
            "offset": point(*offset),
            "paint": paint_json(paint),
        }),
        DrawCmd::DrawImageRect {
            image,
            src,
            dst,
            paint,
        } => json!({
            "op": op,
            "image": image_json(image),
            "src": src.map(rect),
            "dst": rect(*dst),
            "paint": paint_json(paint),
        }),
        DrawCmd::DrawImageNine {
            image,
            src,
            center,
            dst,
            paint,
        } => json!({
            "op": op,
            "image": image_json(image),
            "src": src.map(rect),
            "center": rect(*center),
            "dst": rect(*dst),
            "paint": paint_json(paint),
        }),
        DrawCmd::DrawPicture(picture) => json!({ "op": op, "commands": to_json(picture) }),
        DrawCmd::DrawTextBlob {
            blob,
            offset,
            paint,
        } => json!({
            "op": op,
            "text": blob.text,
            "bounds": rect(blob.bounds),
            "offset": point(*offset),
            "paint": paint_json(paint),
        }),
    }
}

fn paint_json(paint: &Paint) -> Value {
    json!({
        "color": color(paint.color),
        "style": format!("{:?}", paint.style),
        "stroke_width": paint.stroke_width,
        "mask_filter": paint.mask_filter.map(|m| json!({
            "style": format!("{:?}", m.style),
            "sigma": m.sigma,
        })),
        "anti_alias": paint.anti_alias,
    })
}

fn color(c: Color) -> String {
    format!("#{:08x}", c.to_argb32())
}

fn image_json(image: &Image) -> Value {
    json!({ "id": image.id, "width": image.width, "height": image.height })
}

fn point(p: Point) -> Value {
    json!([p.x, p.y])
}

fn rect(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

fn rrect(r: RoundedRect) -> Value {
    let radii = r.radii();
    json!({
        "rect": rect(r.rect()),
        "radii": [radii.top_left, radii.top_right, radii.bottom_right, radii.bottom_left],
    })
}

fn affine(m: Affine) -> Value {
    json!(m.as_coeffs())
}
