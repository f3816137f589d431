//! Context and Frame - the declaration protocol.
//!
//! A [`Context`] owns everything that outlives a frame: the identifier
//! bounds cache, scroll offsets, the arenas' storage and the backends.
//! [`Context::begin_frame`] consumes the input snapshot, resets the arenas
//! and hands out a [`Frame`] that mutably borrows the context. Elements are
//! declared on the frame; [`Frame::end`] solves layout, dispatches
//! interaction callbacks and returns the render commands.
//!
//! The returned [`RenderOutput`] borrows the context, so the text arena it
//! points into cannot be reset (by the next `begin_frame`) while it lives.
//!
//! ```ignore
//! let mut ctx = Context::new(ContextConfig::default());
//! let mut frame = ctx.begin_frame(tracker.snapshot());
//! frame.element(ElementDecl::new().id(ElementId::new("Row")), |f| {
//!     f.text("hello", TextStyle::default());
//! });
//! let output = frame.end()?;
//! presenter.present(&output)?;
//! ```

use std::cell::RefCell;
use std::collections::HashSet;

use crate::config::ContextConfig;
use crate::engine::{
    ConfigArena, ConfigHandle, ConfigKind, ConfigRecord, Element, ElementId, ElementTree,
    FillConfig, FloatingConfig, LayoutConfig, ScrollConfig, Sizing, TextArena, TextRef,
    TextSource, TextStyle,
};
use crate::error::{Diagnostic, Error, ErrorHandler, Result, log_diagnostic};
use crate::layout::{CellMeasure, LayoutEngine, LayoutInput, MeasureText, TaffyLayout, resolve};
use crate::state::{
    InputSnapshot, Interaction, InteractionRegistry, PointerData, ScrollRegistry, Trigger,
};
use crate::types::{Rgba, Vec2};

use super::commands::{CommandBuilder, RenderOutput};

// =============================================================================
// ELEMENT DECLARATION
// =============================================================================

/// Id and configuration of one element, applied right after it opens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementDecl {
    pub id: Option<ElementId>,
    pub layout: Option<LayoutConfig>,
    pub fill: Option<FillConfig>,
    pub floating: Option<FloatingConfig>,
    pub scroll: Option<ScrollConfig>,
}

impl ElementDecl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: ElementId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn fill(mut self, fill: FillConfig) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Solid fill without rounded corners.
    pub fn background(self, color: Rgba) -> Self {
        self.fill(FillConfig::new(color))
    }

    pub fn floating(mut self, floating: FloatingConfig) -> Self {
        self.floating = Some(floating);
        self
    }

    pub fn scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = Some(scroll);
        self
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Long-lived UI state shared by consecutive frames.
pub struct Context {
    config: ContextConfig,
    tree: ElementTree,
    configs: ConfigArena,
    text: TextArena,
    interactions: InteractionRegistry,
    scroll: ScrollRegistry,
    layout: Box<dyn LayoutEngine>,
    measure: Box<dyn MeasureText>,
    on_error: RefCell<ErrorHandler>,
    frame: u64,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

impl Context {
    /// Context with the Taffy layout engine and terminal cell measurement.
    pub fn new(config: ContextConfig) -> Self {
        Self::with_backends(config, TaffyLayout::new(), CellMeasure)
    }

    /// Context with custom layout and measurement backends.
    pub fn with_backends(
        config: ContextConfig,
        layout: impl LayoutEngine + 'static,
        measure: impl MeasureText + 'static,
    ) -> Self {
        Self {
            tree: ElementTree::new(config.max_elements),
            configs: ConfigArena::new(config.max_config_records),
            text: TextArena::new(config.text_capacity),
            interactions: InteractionRegistry::new(config.bounds_retention),
            scroll: ScrollRegistry::new(),
            layout: Box::new(layout),
            measure: Box::new(measure),
            on_error: RefCell::new(Box::new(log_diagnostic)),
            frame: 0,
            config,
        }
    }

    /// Replace the diagnostic sink (defaults to `tracing`).
    pub fn set_error_handler(&mut self, handler: impl FnMut(&Diagnostic) + 'static) {
        self.on_error = RefCell::new(Box::new(handler));
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Number of the last frame begun.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    pub fn interactions(&self) -> &InteractionRegistry {
        &self.interactions
    }

    pub fn scroll(&self) -> &ScrollRegistry {
        &self.scroll
    }

    /// Scroll operations between frames.
    pub fn scroll_mut(&mut self) -> &mut ScrollRegistry {
        &mut self.scroll
    }

    /// Start declaring a frame.
    ///
    /// Resets the configuration and text arenas, derives the pointer
    /// transition, applies the wheel delta and opens the implicit root
    /// sized to the window.
    pub fn begin_frame(&mut self, input: InputSnapshot) -> Frame<'_> {
        self.frame += 1;
        self.configs.reset();
        self.text.clear();
        self.tree.reset();

        let pointer = self.interactions.begin_frame(&input, self.frame);
        if let Some(target) = self.scroll.apply_wheel(
            pointer.position,
            input.scroll_delta(),
            self.config.wheel_scroll_lines,
        ) {
            tracing::trace!(frame = self.frame, container = target.id, "wheel scroll");
        }
        tracing::debug!(frame = self.frame, ?pointer, "begin frame");

        let mut frame = Frame {
            ctx: self,
            input,
            pointer,
            handlers: Vec::new(),
            seen_ids: HashSet::new(),
            poisoned: None,
        };
        frame.open_root();
        frame
    }

    fn report(&self, error: Error) {
        let diagnostic = Diagnostic {
            frame: self.frame,
            error,
        };
        let mut handler = self.on_error.borrow_mut();
        (*handler)(&diagnostic);
    }
}

// =============================================================================
// FRAME
// =============================================================================

struct Handler<'c> {
    id: ElementId,
    trigger: Trigger,
    callback: Box<dyn FnMut(&Interaction) + 'c>,
}

/// One frame's declaration scope.
///
/// Low-level operations (`open_element`, `store`, `attach`, ...) return
/// `Result`; the closure-based ones (`element`, `text`, ...) report through
/// the diagnostic sink and keep going. A fatal error poisons the frame:
/// every later operation is skipped and [`Frame::end`] returns the error.
pub struct Frame<'c> {
    ctx: &'c mut Context,
    input: InputSnapshot,
    pointer: PointerData,
    handlers: Vec<Handler<'c>>,
    seen_ids: HashSet<u32>,
    poisoned: Option<Error>,
}

impl<'c> Frame<'c> {
    fn open_root(&mut self) {
        let window = self.input.window();
        if let Err(err) = self.ctx.tree.open() {
            self.fail::<()>(err).ok();
            return;
        }
        let root = LayoutConfig::default().sizing(Sizing::fixed(window.width, window.height));
        match self.ctx.configs.store(root) {
            Ok(handle) => {
                if let Err(err) = self.ctx.tree.attach(ConfigKind::LAYOUT, handle.index()) {
                    self.fail::<()>(err).ok();
                }
            }
            Err(err) => {
                self.fail::<()>(err).ok();
            }
        }
    }

    /// Report an error, poisoning the frame if it is fatal.
    fn fail<T>(&mut self, error: Error) -> Result<T> {
        self.ctx.report(error.clone());
        if error.is_fatal() && self.poisoned.is_none() {
            self.poisoned = Some(error.clone());
        }
        Err(error)
    }

    fn check(&self) -> Result<()> {
        match &self.poisoned {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// The element declarations apply to; `None` while inside a skipped one.
    fn target(&mut self) -> Result<Option<usize>> {
        self.check()?;
        if self.ctx.tree.is_skipping() {
            return Ok(None);
        }
        match self.ctx.tree.current() {
            Some(index) if index > 0 => Ok(Some(index)),
            _ => self.fail(Error::NoOpenElement),
        }
    }

    // -------------------------------------------------------------------------
    // Snapshot
    // -------------------------------------------------------------------------

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    pub fn pointer(&self) -> PointerData {
        self.pointer
    }

    pub fn frame_index(&self) -> u64 {
        self.ctx.frame
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    // -------------------------------------------------------------------------
    // Low-level declaration
    // -------------------------------------------------------------------------

    /// Open an element as a child of the open one.
    ///
    /// Returns its index, or `None` while inside an element skipped for
    /// capacity. A capacity error still requires the matching close.
    pub fn open_element(&mut self) -> Result<Option<usize>> {
        self.check()?;
        match self.ctx.tree.open() {
            Ok(index) => Ok(index),
            Err(err) => self.fail(err),
        }
    }

    /// Close the open element. Closing the implicit root is an error.
    pub fn close_element(&mut self) -> Result<()> {
        self.check()?;
        if self.ctx.tree.depth() <= 1 {
            return self.fail(Error::UnbalancedClose);
        }
        match self.ctx.tree.close() {
            Ok(_) => Ok(()),
            Err(err) => self.fail(err),
        }
    }

    /// Name the open element.
    pub fn attach_id(&mut self, id: ElementId) -> Result<()> {
        if self.target()?.is_none() {
            return Ok(());
        }
        if let Err(err) = self.ctx.tree.set_id(id) {
            return self.fail(err);
        }
        if !self.seen_ids.insert(id.id) {
            // The element keeps the id; hover state becomes ambiguous.
            self.fail::<()>(Error::DuplicateId { id: id.id }).ok();
        }
        Ok(())
    }

    /// Copy a configuration record into the frame's arena.
    pub fn store<T: ConfigRecord>(&mut self, record: T) -> Result<ConfigHandle<T>> {
        self.check()?;
        match self.ctx.configs.store(record) {
            Ok(handle) => Ok(handle),
            Err(err) => self.fail(err),
        }
    }

    /// Attach a stored record to the open element.
    pub fn attach<T: ConfigRecord>(&mut self, handle: ConfigHandle<T>) -> Result<()> {
        if self.target()?.is_none() {
            return Ok(());
        }
        if let Err(err) = self.ctx.configs.check(handle) {
            return self.fail(err);
        }
        match self.ctx.tree.attach(T::KIND, handle.index()) {
            Ok(()) => Ok(()),
            Err(err) => self.fail(err),
        }
    }

    /// Store and attach in one step.
    pub fn configure<T: ConfigRecord>(&mut self, record: T) -> Result<()> {
        if self.target()?.is_none() {
            return Ok(());
        }
        let handle = self.store(record)?;
        self.attach(handle)
    }

    /// Copy runtime text into the frame's text arena.
    pub fn intern(&mut self, text: &str) -> Result<TextRef> {
        self.check()?;
        match self.ctx.text.intern(text) {
            Ok(text) => Ok(text),
            Err(err) => self.fail(err),
        }
    }

    // -------------------------------------------------------------------------
    // Scoped declaration
    // -------------------------------------------------------------------------

    /// Declare an element; `children` runs inside it. The element is
    /// always closed after `children` returns.
    pub fn element(&mut self, decl: ElementDecl, children: impl FnOnce(&mut Self)) {
        if self.check().is_err() {
            return;
        }
        if self.open_element().is_err() && self.is_poisoned() {
            return;
        }
        self.apply(decl);
        children(self);
        self.close_element().ok();
    }

    /// Declare an element without children.
    pub fn leaf(&mut self, decl: ElementDecl) {
        self.element(decl, |_| {});
    }

    fn apply(&mut self, decl: ElementDecl) {
        // Failures are reported by the calls themselves.
        if let Some(id) = decl.id {
            self.attach_id(id).ok();
        }
        if let Some(layout) = decl.layout {
            self.configure(layout).ok();
        }
        if let Some(fill) = decl.fill {
            self.configure(fill).ok();
        }
        if let Some(floating) = decl.floating {
            self.configure(floating).ok();
        }
        if let Some(scroll) = decl.scroll {
            self.configure(scroll).ok();
        }
    }

    /// Declare a text leaf. Literals are referenced, interned text must
    /// come from this frame.
    pub fn text(&mut self, text: impl Into<TextSource>, style: TextStyle) {
        if self.check().is_err() {
            return;
        }
        let source = text.into();
        if let TextSource::Interned(text) = source {
            if let Err(err) = self.ctx.text.resolve(text) {
                self.fail::<()>(err).ok();
                return;
            }
        }

        let opened = self.open_element();
        if opened.is_err() && self.is_poisoned() {
            return;
        }
        if matches!(opened, Ok(Some(_))) {
            self.configure(style).ok();
            if let Err(err) = self.ctx.tree.set_text(source) {
                self.fail::<()>(err).ok();
            }
        }
        self.close_element().ok();
    }

    /// Copy `text` into the frame's arena and declare it as a text leaf.
    pub fn dynamic_text(&mut self, text: &str, style: TextStyle) {
        if let Ok(text) = self.intern(text) {
            self.text(text, style);
        }
    }

    // -------------------------------------------------------------------------
    // Identifiers
    // -------------------------------------------------------------------------

    fn current_id(&self) -> ElementId {
        self.ctx
            .tree
            .current()
            .and_then(|index| self.ctx.tree.get(index))
            .map(|element| element.id)
            .unwrap_or_default()
    }

    /// Id scoped under the open element.
    pub fn local_id(&self, name: &str) -> ElementId {
        ElementId::scoped(name, 0, self.current_id())
    }

    /// Indexed id scoped under the open element.
    pub fn local_id_indexed(&self, name: &str, index: u32) -> ElementId {
        ElementId::scoped(name, index, self.current_id())
    }

    // -------------------------------------------------------------------------
    // Interaction queries (previous frame's geometry)
    // -------------------------------------------------------------------------

    pub fn is_hovered(&self, id: ElementId) -> bool {
        self.ctx.interactions.is_hovered(id)
    }

    pub fn is_pressed(&self, id: ElementId) -> bool {
        self.ctx.interactions.is_pressed(id)
    }

    pub fn is_released(&self, id: ElementId) -> bool {
        self.ctx.interactions.is_released(id)
    }

    pub fn is_down(&self, id: ElementId) -> bool {
        self.ctx.interactions.is_down(id)
    }

    /// Whether the open element is hovered.
    pub fn hovered(&self) -> bool {
        if self.ctx.tree.is_skipping() {
            return false;
        }
        self.is_hovered(self.current_id())
    }

    /// Ids under the pointer, by last frame's geometry.
    pub fn pointer_over_ids(&self) -> Vec<ElementId> {
        self.ctx.interactions.pointer_over_ids()
    }

    /// Scroll offset a container is laid out with.
    pub fn scroll_offset(&self, id: ElementId) -> Vec2 {
        self.ctx.scroll.offset(id)
    }

    /// Run `callback` after layout if `trigger` happens on `id` this frame.
    pub fn on_interaction(
        &mut self,
        id: ElementId,
        trigger: Trigger,
        callback: impl FnMut(&Interaction) + 'c,
    ) {
        self.handlers.push(Handler {
            id,
            trigger,
            callback: Box::new(callback),
        });
    }

    /// Hover callback for the open element.
    pub fn on_hover(&mut self, callback: impl FnMut(&Interaction) + 'c) {
        match self.target() {
            Ok(Some(_)) => {
                let id = self.current_id();
                self.on_interaction(id, Trigger::Hover, callback);
            }
            Ok(None) | Err(_) => {}
        }
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Index of the open element (`None` for the implicit root).
    pub fn current_index(&self) -> Option<usize> {
        self.ctx.tree.current().filter(|&index| index > 0)
    }

    pub fn element_at(&self, index: usize) -> Option<&Element> {
        self.ctx.tree.get(index)
    }

    /// Record of category `T` attached to element `index`.
    pub fn config_of<T: ConfigRecord>(&self, index: usize) -> Option<&T> {
        let slot = self.ctx.tree.get(index)?.config_slot(T::KIND)?;
        self.ctx.configs.slot::<T>(slot)
    }

    // -------------------------------------------------------------------------
    // End
    // -------------------------------------------------------------------------

    /// Finish the frame: verify nesting, solve layout, update interaction
    /// state, fire callbacks and produce render commands.
    pub fn end(self) -> Result<RenderOutput<'c>> {
        let Frame {
            ctx,
            input,
            pointer,
            mut handlers,
            poisoned,
            ..
        } = self;

        if let Some(err) = poisoned {
            tracing::debug!(frame = ctx.frame, "frame discarded: {err}");
            return Err(err);
        }

        let depth = ctx.tree.depth();
        if depth != 1 {
            let err = Error::UnclosedElements {
                open: depth.saturating_sub(1),
            };
            ctx.report(err.clone());
            return Err(err);
        }
        if let Err(err) = ctx.tree.close().and_then(|_| ctx.tree.finish()) {
            ctx.report(err.clone());
            return Err(err);
        }

        // Layout
        let viewport = input.window();
        let mut reported = Vec::new();
        let nodes = ctx.layout.compute(
            &LayoutInput {
                tree: &ctx.tree,
                configs: &ctx.configs,
                text: &ctx.text,
                measure: &*ctx.measure,
                viewport,
            },
            &mut reported,
        );
        for err in &reported {
            ctx.report(err.clone());
        }
        let nodes = match nodes {
            Ok(nodes) => nodes,
            Err(err) => {
                ctx.report(err.clone());
                return Err(err);
            }
        };
        let mut resolved = resolve(&ctx.tree, &ctx.configs, &nodes, &mut ctx.scroll);

        // Interaction state for the next frame
        for (index, element) in ctx.tree.elements().iter().enumerate() {
            if let Some(visible) = resolved.visible(index) {
                ctx.interactions.record(element.id, visible, resolved.layer[index]);
            }
        }
        ctx.interactions
            .set_capture_layers(std::mem::take(&mut resolved.capture_layers));
        ctx.scroll
            .commit(std::mem::take(&mut resolved.scroll_containers));

        for handler in handlers.iter_mut() {
            if !handler.trigger.matches(pointer.state) {
                continue;
            }
            if let Some(bounds) = ctx.interactions.hit_current(handler.id) {
                (handler.callback)(&Interaction {
                    id: handler.id,
                    pointer,
                    bounds,
                });
            }
        }
        drop(handlers);
        let evicted = ctx.interactions.evict();

        // Commands borrow the text arena for the rest of 'c.
        let ctx: &'c Context = ctx;
        let already = reported.len();
        let commands = CommandBuilder {
            tree: &ctx.tree,
            configs: &ctx.configs,
            text: &ctx.text,
            resolved: &resolved,
            measure: &*ctx.measure,
            viewport,
            culling: ctx.config.culling,
        }
        .build(&mut reported);
        for err in reported.drain(already..) {
            ctx.report(err);
        }

        tracing::debug!(
            frame = ctx.frame,
            elements = ctx.tree.len(),
            commands = commands.len(),
            "frame resolved"
        );
        tracing::trace!(
            frame = ctx.frame,
            configs = ctx.configs.len(),
            text_bytes = ctx.text.used(),
            cached_ids = ctx.interactions.len(),
            evicted,
            "arena usage"
        );

        Ok(RenderOutput {
            frame: ctx.frame,
            viewport,
            commands,
        })
    }
}
