// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builds a corner box and a notification frame, draws them into a display
//! list and prints what was recorded.
//!
//! Set `RUST_LOG=contour=debug` to watch relayouts and tail fitting.

use contour::{
    peniko::{
        kurbo::{Rect, Vec2},
        Color,
    },
    BorderStyle, CornerBox, CornerMask, DisplayItem, DisplayList, Drawable, LayeredDrawable,
    NotificationFrame, OutlineSeg, ShadowStyle, ShapePathBuilder, Side, TailStyle, TipPosition,
};
use vello::Scene;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let outline = ShapePathBuilder::default().build_outline(
        Rect::new(0.0, 0.0, 100.0, 60.0),
        10.0,
        CornerMask::TOP,
        None,
    );
    println!("outline from {:?}", outline.start());
    for seg in outline.segments() {
        match seg {
            OutlineSeg::Line(p) => println!("  line to ({:.1}, {:.1})", p.x, p.y),
            OutlineSeg::Arc(arc) => println!(
                "  arc around ({:.1}, {:.1}) r={:.1} from {:.0}°",
                arc.center.x,
                arc.center.y,
                arc.radii.x,
                arc.start_angle.to_degrees()
            ),
        }
    }
    println!("area {:.2}", outline.area(0.1));

    let mut card = CornerBox::with_border(
        Color::from_rgba8(250, 250, 250, 255),
        BorderStyle {
            color: Color::from_rgba8(200, 200, 210, 255),
            width: 1.0,
        },
    );
    card.set_radius(12.0);
    card.set_corner_mask(CornerMask::TOP | CornerMask::BOTTOM_RIGHT);
    card.set_shadow(Some(ShadowStyle {
        color: Color::from_rgba8(0, 0, 0, 60),
        blur_radius: 6.0,
        offset: Vec2::new(0.0, 2.0),
    }));

    let mut bubble = NotificationFrame::new(Color::from_rgba8(40, 120, 220, 255));
    bubble.set_radius(8.0);
    bubble.set_tail(TailStyle {
        side: Side::Bottom,
        tip: TipPosition::Absolute(30.0),
        width: 16.0,
        tip_distance: 10.0,
        margin: 6.0,
    });

    let mut root = LayeredDrawable::new();
    root.set_backdrop(Some(Color::WHITE));
    root.set_clip_to_bounds(true);
    let card_id = root.add_layer(Box::new(card));
    let bubble_id = root.insert_after(Box::new(bubble), card_id);
    root.set_bounds(Rect::new(0.0, 0.0, 320.0, 200.0));
    if let Some(bubble) = root.layer_as_mut::<NotificationFrame>(bubble_id) {
        bubble.set_bounds(Rect::new(180.0, 20.0, 300.0, 100.0));
        tracing::info!(fitted = ?bubble.fitted(), "bubble tail");
    }

    let mut list = DisplayList::default();
    root.draw(&mut list);
    println!(
        "{} items: {} fills, {} strokes, {} blurs, opacity {:?}",
        list.items.len(),
        list.fill_count(),
        list.stroke_count(),
        list.blur_count(),
        root.opacity()
    );
    for item in &list.items {
        match item {
            DisplayItem::Fill { path, .. } | DisplayItem::Stroke { path, .. } => {
                println!("  path with {} elements", path.elements().len());
            }
            other => println!("  {other:?}"),
        }
    }

    let mut env = contour_vello::Environment::default();
    let mut scene = Scene::new();
    env.add_display_list_to_scene(&mut scene, &list);
    tracing::info!(buffers = env.live_buffers(), "scene built");
}
