//! Full frames through the declaration protocol, Taffy layout and command
//! generation. No terminal involved.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_frame::{
    AttachPoint, BoundingBox, Context, ContextConfig, Diagnostic, Dimensions, ElementDecl,
    ElementId, Error, FillConfig, FloatingConfig, InputSnapshot, LayoutConfig, LayoutDirection,
    PointerCapture, RenderCommand, RenderOutput, Rgba, ScrollConfig, Sizing, TextStyle, Trigger,
    Vec2,
};

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn window() -> Dimensions {
    Dimensions::new(40.0, 10.0)
}

fn pointer_at(x: f32, y: f32, down: bool) -> InputSnapshot {
    InputSnapshot::capture(window(), Vec2::new(x, y), down, Vec2::ZERO, 0.016)
}

fn wheel_at(x: f32, y: f32, notches: f32) -> InputSnapshot {
    InputSnapshot::capture(window(), Vec2::new(x, y), false, Vec2::new(0.0, notches), 0.016)
}

fn boxed(id: ElementId, width: f32, height: f32) -> ElementDecl {
    ElementDecl::new()
        .id(id)
        .layout(LayoutConfig::default().sizing(Sizing::fixed(width, height)))
        .background(Rgba::GRAY)
}

fn rects(output: &RenderOutput<'_>) -> Vec<(ElementId, BoundingBox)> {
    output
        .iter()
        .filter_map(|command| match command {
            RenderCommand::Rectangle { id, bounds, .. } => Some((*id, *bounds)),
            _ => None,
        })
        .collect()
}

fn collect_diagnostics(ctx: &mut Context) -> Rc<RefCell<Vec<Diagnostic>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    ctx.set_error_handler(move |diagnostic| sink.borrow_mut().push(diagnostic.clone()));
    seen
}

/// Three fixed 10x1 siblings labelled "A", side by side from the origin.
fn declare_row(ctx: &mut Context, input: InputSnapshot) -> Vec<(ElementId, BoundingBox)> {
    let mut frame = ctx.begin_frame(input);
    for i in 0..3 {
        frame.leaf(boxed(ElementId::indexed("A", i), 10.0, 1.0));
    }
    let output = frame.end().unwrap();
    rects(&output)
}

// -----------------------------------------------------------------------------
// Identity and hover
// -----------------------------------------------------------------------------

#[test]
fn test_siblings_with_one_label_get_distinct_ids_and_bounds() {
    let mut ctx = Context::default();
    let rects = declare_row(&mut ctx, pointer_at(0.0, 0.0, false));

    let ids: Vec<ElementId> = rects.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        ids,
        vec![
            ElementId::indexed("A", 0),
            ElementId::indexed("A", 1),
            ElementId::indexed("A", 2),
        ]
    );
    assert_ne!(ids[0].id, ids[1].id);
    assert_ne!(ids[1].id, ids[2].id);

    let xs: Vec<f32> = rects.iter().map(|(_, b)| b.x).collect();
    assert_eq!(xs, vec![0.0, 10.0, 20.0]);
}

#[test]
fn test_hover_uses_previous_frame_geometry() {
    let mut ctx = Context::default();
    let middle = ElementId::indexed("A", 1);

    // Nothing has been laid out yet: no hover during the first frame.
    {
        let mut frame = ctx.begin_frame(pointer_at(15.0, 0.5, false));
        assert!(!frame.is_hovered(middle));
        for i in 0..3 {
            frame.leaf(boxed(ElementId::indexed("A", i), 10.0, 1.0));
        }
        frame.end().unwrap();
    }

    let mut frame = ctx.begin_frame(pointer_at(15.0, 0.5, false));
    assert!(frame.is_hovered(middle));
    assert!(!frame.is_hovered(ElementId::indexed("A", 0)));
    assert!(!frame.is_hovered(ElementId::indexed("A", 2)));
    assert!(frame.pointer_over_ids().contains(&middle));
    frame.end().unwrap();
}

#[test]
fn test_hover_on_integer_cells_hits_one_sibling() {
    let mut ctx = Context::default();
    declare_row(&mut ctx, pointer_at(0.0, 0.0, false));
    let ids: Vec<ElementId> = (0..3).map(|i| ElementId::indexed("A", i)).collect();

    // Cell 10 is the first cell of the middle box, not the last of the first.
    let frame = ctx.begin_frame(pointer_at(10.0, 0.0, false));
    let hovered: Vec<bool> = ids.iter().map(|id| frame.is_hovered(*id)).collect();
    assert_eq!(hovered, vec![false, true, false]);
    assert_eq!(frame.pointer_over_ids().iter().filter(|id| ids.contains(id)).count(), 1);
    frame.end().unwrap();

    declare_row(&mut ctx, pointer_at(0.0, 0.0, false));
    let frame = ctx.begin_frame(pointer_at(9.0, 0.0, false));
    assert!(frame.is_hovered(ids[0]));
    assert!(!frame.is_hovered(ids[1]));
    frame.end().unwrap();

    // The row below one-row boxes is outside all of them.
    declare_row(&mut ctx, pointer_at(0.0, 0.0, false));
    let frame = ctx.begin_frame(pointer_at(5.0, 1.0, false));
    assert!(ids.iter().all(|id| !frame.is_hovered(*id)));
    frame.end().unwrap();
}

#[test]
fn test_press_on_shared_edge_selects_one_item() {
    let mut ctx = Context::default();
    let selected = RefCell::new(Vec::new());
    {
        let mut frame = ctx.begin_frame(pointer_at(10.0, 0.0, true));
        for index in 0..3 {
            let selected = &selected;
            frame.element(boxed(ElementId::indexed("Item", index), 10.0, 1.0), |f| {
                f.on_hover(move |interaction| {
                    if interaction.pointer.state.is_down() {
                        selected.borrow_mut().push(index);
                    }
                });
            });
        }
        frame.end().unwrap();
    }
    assert_eq!(selected.into_inner(), vec![1]);
}

#[test]
fn test_identical_declarations_produce_identical_commands() {
    let mut first = Context::default();
    let mut second = Context::default();
    let a = declare_row(&mut first, pointer_at(0.0, 0.0, false));
    let b = declare_row(&mut second, pointer_at(0.0, 0.0, false));
    assert_eq!(a, b);
}

// -----------------------------------------------------------------------------
// Configuration and text
// -----------------------------------------------------------------------------

#[test]
fn test_fill_and_layout_attach_to_the_open_element() {
    let mut ctx = Context::default();
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));

    let index = frame.open_element().unwrap().unwrap();
    let fill = FillConfig::new(Rgba::rgb(200, 10, 10));
    let layout = LayoutConfig::default().sizing(Sizing::fixed(4.0, 2.0));
    let handle = frame.store(fill).unwrap();
    frame.attach(handle).unwrap();
    frame.configure(layout).unwrap();
    assert_eq!(frame.config_of::<FillConfig>(index), Some(&fill));
    assert_eq!(frame.config_of::<LayoutConfig>(index), Some(&layout));
    frame.close_element().unwrap();

    // Same records, attached in the opposite order.
    let reversed = frame.open_element().unwrap().unwrap();
    frame.configure(layout).unwrap();
    let handle = frame.store(fill).unwrap();
    frame.attach(handle).unwrap();
    assert_eq!(frame.config_of::<FillConfig>(reversed), Some(&fill));
    assert_eq!(frame.config_of::<LayoutConfig>(reversed), Some(&layout));
    frame.close_element().unwrap();

    let output = frame.end().unwrap();
    assert_eq!(output.len(), 2);
    match output.commands[1] {
        RenderCommand::Rectangle { bounds, color, .. } => {
            assert_eq!(bounds, BoundingBox::new(4.0, 0.0, 4.0, 2.0));
            assert_eq!(color, Rgba::rgb(200, 10, 10));
        }
        ref other => panic!("expected a rectangle, got {other:?}"),
    }
    match output.commands[0] {
        RenderCommand::Rectangle { bounds, color, .. } => {
            assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 4.0, 2.0));
            assert_eq!(color, Rgba::rgb(200, 10, 10));
        }
        ref other => panic!("expected a rectangle, got {other:?}"),
    }
}

#[test]
fn test_runtime_text_is_copied_into_the_frame() {
    let mut ctx = Context::default();
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    {
        let title = format!("Document {}", 7);
        frame.dynamic_text(&title, TextStyle::default());
        // `title` is dropped here; the frame keeps its own copy.
    }
    frame.text("static", TextStyle::default());
    let output = frame.end().unwrap();
    assert_eq!(output.texts().collect::<Vec<_>>(), vec!["Document 7", "static"]);
}

#[test]
fn test_text_wraps_to_container_width() {
    let mut ctx = Context::default();
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    let column = ElementDecl::new().layout(
        LayoutConfig::default()
            .sizing(Sizing::fixed(11.0, 5.0))
            .direction(LayoutDirection::TopToBottom),
    );
    frame.element(column, |f| f.text("hello world foo", TextStyle::default()));
    let output = frame.end().unwrap();

    assert_eq!(output.texts().collect::<Vec<_>>(), vec!["hello world", "foo"]);
    let ys: Vec<f32> = output
        .iter()
        .filter_map(|c| match c {
            RenderCommand::Text { bounds, .. } => Some(bounds.y),
            _ => None,
        })
        .collect();
    assert_eq!(ys, vec![0.0, 1.0]);
}

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

#[test]
fn test_extra_close_fails_the_frame() {
    let mut ctx = Context::default();
    let seen = collect_diagnostics(&mut ctx);
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    frame.open_element().unwrap();
    frame.close_element().unwrap();
    assert_eq!(frame.close_element(), Err(Error::UnbalancedClose));
    assert_eq!(frame.end().unwrap_err(), Error::UnbalancedClose);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_fatal());
    assert_eq!(seen[0].frame, 1);
}

#[test]
fn test_missing_close_fails_the_frame() {
    let mut ctx = Context::default();
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    frame.open_element().unwrap();
    assert_eq!(frame.end().unwrap_err(), Error::UnclosedElements { open: 1 });

    // The next frame starts clean.
    let frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    assert!(frame.end().is_ok());
}

#[test]
fn test_second_record_of_one_category_is_rejected() {
    let mut ctx = Context::default();
    let seen = collect_diagnostics(&mut ctx);
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    let index = frame.open_element().unwrap().unwrap();
    frame.configure(LayoutConfig::default()).unwrap();
    let err = frame.configure(LayoutConfig::default()).unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateConfig {
            kind: "layout",
            element: index
        }
    );
    frame.close_element().ok();
    assert_eq!(frame.end().unwrap_err(), err);
    assert_eq!(seen.borrow().len(), 1);
    assert!(seen.borrow()[0].to_string().contains("fatal"));
}

#[test]
fn test_capacity_exhaustion_degrades_without_failing() {
    let mut ctx = Context::new(ContextConfig::default().with_max_elements(3));
    let seen = collect_diagnostics(&mut ctx);
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    for i in 0..4 {
        frame.element(boxed(ElementId::indexed("B", i), 2.0, 1.0), |f| {
            f.leaf(ElementDecl::new());
        });
    }
    let output = frame.end().unwrap();

    // Root, B0 and B0's child fit; B1..B3 are skipped along with their children.
    assert_eq!(rects(&output).len(), 1);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|d| !d.is_fatal()));
    assert!(matches!(seen[0].error, Error::ElementCapacityExceeded { capacity: 3 }));
}

#[test]
fn test_stale_text_reference_is_rejected() {
    let mut ctx = Context::default();
    let stale = {
        let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
        let text = frame.intern("old").unwrap();
        frame.end().unwrap();
        text
    };
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    frame.text(stale, TextStyle::default());
    assert!(matches!(frame.end(), Err(Error::StaleText { .. })));
}

// -----------------------------------------------------------------------------
// Callbacks
// -----------------------------------------------------------------------------

#[test]
fn test_press_callback_fires_once_per_press() {
    let mut ctx = Context::default();
    let button = ElementId::new("Button");
    let presses = Rc::new(Cell::new(0));

    for down in [false, true, true, false, true] {
        let mut frame = ctx.begin_frame(pointer_at(1.0, 0.5, down));
        let counter = presses.clone();
        frame.leaf(boxed(button, 5.0, 1.0));
        frame.on_interaction(button, Trigger::Press, move |interaction| {
            assert_eq!(interaction.id, ElementId::new("Button"));
            counter.set(counter.get() + 1);
        });
        frame.end().unwrap();
    }
    assert_eq!(presses.get(), 2);
}

#[test]
fn test_callback_can_update_application_state() {
    let mut ctx = Context::default();
    let selected = Cell::new(None);
    let items: Vec<ElementId> = (0..3).map(|i| ElementId::indexed("Item", i)).collect();

    {
        let mut frame = ctx.begin_frame(pointer_at(12.0, 0.0, true));
        for (index, id) in items.iter().enumerate() {
            let selected = &selected;
            frame.element(boxed(*id, 10.0, 1.0), |f| {
                f.on_hover(move |interaction| {
                    if interaction.pointer.state.is_down() {
                        selected.set(Some(index));
                    }
                });
            });
        }
        frame.end().unwrap();
    }
    assert_eq!(selected.get(), Some(1));
}

// -----------------------------------------------------------------------------
// Floating panels
// -----------------------------------------------------------------------------

fn declare_menu(ctx: &mut Context, input: InputSnapshot, capture: PointerCapture) -> Vec<ElementId> {
    let mut frame = ctx.begin_frame(input);
    let base = ElementDecl::new()
        .id(ElementId::new("Base"))
        .layout(
            LayoutConfig::default()
                .sizing(Sizing::fixed(20.0, 10.0))
                .direction(LayoutDirection::TopToBottom),
        );
    frame.element(base, |f| {
        f.element(boxed(ElementId::new("Button"), 10.0, 2.0), |f| {
            let menu = boxed(ElementId::new("Menu"), 10.0, 3.0).floating(
                FloatingConfig::default()
                    .attach(AttachPoint::LeftTop, AttachPoint::LeftBottom)
                    .pointer_capture(capture),
            );
            f.leaf(menu);
        });
        f.leaf(boxed(ElementId::new("Below"), 10.0, 6.0));
    });
    let output = frame.end().unwrap();
    rects(&output).into_iter().map(|(id, _)| id).collect()
}

#[test]
fn test_floating_panel_paints_last_at_its_anchor() {
    let mut ctx = Context::default();
    let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
    frame.element(boxed(ElementId::new("Button"), 10.0, 2.0), |f| {
        let menu = boxed(ElementId::new("Menu"), 10.0, 3.0)
            .floating(FloatingConfig::default().attach(AttachPoint::LeftTop, AttachPoint::LeftBottom));
        f.leaf(menu);
    });
    frame.leaf(boxed(ElementId::new("Next"), 5.0, 5.0));
    let output = frame.end().unwrap();

    let rects = rects(&output);
    let ids: Vec<ElementId> = rects.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        ids,
        vec![ElementId::new("Button"), ElementId::new("Next"), ElementId::new("Menu")]
    );
    // Out of flow: "Next" follows the button directly.
    assert_eq!(rects[1].1.x, 10.0);
    assert_eq!(rects[2].1, BoundingBox::new(0.0, 2.0, 10.0, 3.0));
}

#[test]
fn test_capturing_panel_occludes_elements_beneath() {
    let mut ctx = Context::default();
    declare_menu(&mut ctx, pointer_at(3.0, 3.0, false), PointerCapture::Capture);

    let frame = ctx.begin_frame(pointer_at(3.0, 3.0, false));
    assert!(frame.is_hovered(ElementId::new("Menu")));
    assert!(!frame.is_hovered(ElementId::new("Below")));
    assert!(!frame.is_hovered(ElementId::new("Button")));
    frame.end().unwrap();
}

#[test]
fn test_passthrough_panel_lets_hover_through() {
    let mut ctx = Context::default();
    declare_menu(&mut ctx, pointer_at(3.0, 3.0, false), PointerCapture::Passthrough);

    let frame = ctx.begin_frame(pointer_at(3.0, 3.0, false));
    assert!(frame.is_hovered(ElementId::new("Menu")));
    assert!(frame.is_hovered(ElementId::new("Below")));
    frame.end().unwrap();
}

// -----------------------------------------------------------------------------
// Scrolling
// -----------------------------------------------------------------------------

fn declare_list(ctx: &mut Context, input: InputSnapshot) -> Vec<(ElementId, BoundingBox)> {
    let mut frame = ctx.begin_frame(input);
    let list = ElementDecl::new()
        .id(ElementId::new("List"))
        .scroll(ScrollConfig::vertical())
        .layout(
            LayoutConfig::default()
                .sizing(Sizing::fixed(10.0, 3.0))
                .direction(LayoutDirection::TopToBottom),
        );
    frame.element(list, |f| {
        for i in 0..10 {
            f.leaf(boxed(ElementId::indexed("Row", i), 10.0, 1.0));
        }
    });
    let output = frame.end().unwrap();
    assert!(matches!(output.commands.first(), Some(RenderCommand::ScissorStart { .. })));
    assert!(matches!(output.commands.last(), Some(RenderCommand::ScissorEnd { .. })));
    rects(&output)
}

#[test]
fn test_wheel_scrolls_container_under_pointer() {
    let mut ctx = Context::default();
    let list = ElementId::new("List");

    let visible = declare_list(&mut ctx, pointer_at(1.0, 1.0, false));
    assert_eq!(visible.len(), 3);
    assert_eq!(visible[0].0, ElementId::indexed("Row", 0));

    // One notch down scrolls three lines.
    let visible = declare_list(&mut ctx, wheel_at(1.0, 1.0, -1.0));
    assert_eq!(ctx.scroll().offset(list), Vec2::new(0.0, 3.0));
    assert_eq!(visible[0].0, ElementId::indexed("Row", 3));
    assert_eq!(visible[0].1.y, 0.0);

    // Clamped at the end of the content.
    declare_list(&mut ctx, wheel_at(1.0, 1.0, -5.0));
    assert_eq!(ctx.scroll().offset(list), Vec2::new(0.0, 7.0));
}

#[test]
fn test_scroll_offset_set_between_frames() {
    let mut ctx = Context::default();
    let list = ElementId::new("List");
    declare_list(&mut ctx, pointer_at(30.0, 8.0, false));

    ctx.scroll_mut().scroll_to_bottom(list);
    let visible = declare_list(&mut ctx, pointer_at(30.0, 8.0, false));
    assert_eq!(visible[0].0, ElementId::indexed("Row", 7));

    ctx.scroll_mut().scroll_to_top(list);
    let visible = declare_list(&mut ctx, pointer_at(30.0, 8.0, false));
    assert_eq!(visible[0].0, ElementId::indexed("Row", 0));
}

#[test]
fn test_undeclared_container_forgets_its_offset() {
    let mut ctx = Context::default();
    let list = ElementId::new("List");
    declare_list(&mut ctx, pointer_at(1.0, 1.0, false));
    declare_list(&mut ctx, wheel_at(1.0, 1.0, -1.0));
    assert_eq!(ctx.scroll().offset(list), Vec2::new(0.0, 3.0));

    ctx.begin_frame(pointer_at(1.0, 1.0, false)).end().unwrap();
    assert_eq!(ctx.scroll().offset(list), Vec2::ZERO);
}

// -----------------------------------------------------------------------------
// Culling
// -----------------------------------------------------------------------------

#[test]
fn test_offscreen_elements_are_culled() {
    let declare = |ctx: &mut Context| {
        let mut frame = ctx.begin_frame(pointer_at(0.0, 0.0, false));
        for i in 0..3 {
            frame.leaf(boxed(ElementId::indexed("Wide", i), 20.0, 1.0));
        }
        let output = frame.end().unwrap();
        rects(&output).len()
    };

    let mut culled = Context::default();
    assert_eq!(declare(&mut culled), 2);

    let mut unculled = Context::new(ContextConfig::default().with_culling(false));
    assert_eq!(declare(&mut unculled), 3);
}
