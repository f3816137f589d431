//! Document viewer.
//!
//! Header bar with a File menu that opens while hovered, a sidebar of
//! documents (click to select) and a scrollable content pane. The third
//! document is replaced at frame 200 to show runtime text flowing through
//! the frame's text arena.
//!
//! Run with `cargo run --example documents`. Set `RUST_LOG=spark_frame=debug`
//! to get frame diagnostics in `documents.log`. Arrow, page, Home and End
//! keys scroll the content. Quit with `q` or Esc.

use std::cell::Cell;
use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use tracing_subscriber::EnvFilter;

use spark_frame::state::poll_event;
use spark_frame::{
    AlignX, AlignY, AttachPoint, Context, ContextConfig, ElementDecl, ElementId, FillConfig,
    FloatingConfig, Frame, InputTracker, Interaction, LayoutConfig, LayoutDirection, Padding,
    PointerState, Presenter, Rgba, ScrollConfig, Sizing, SizingAxis, TerminalPresenter, TextStyle,
};

const BACKGROUND: Rgba = Rgba::rgb(43, 41, 51);
const CONTENT_BACKGROUND: Rgba = Rgba::rgb(90, 90, 90);
const HEADER_BUTTON: Rgba = Rgba::rgb(140, 140, 140);
const MENU_BACKGROUND: Rgba = Rgba::rgb(40, 40, 40);
const SELECTED: Rgba = Rgba::rgb(120, 120, 120);
const HOVERED: Rgba = Rgba::new(120, 120, 120, 120);

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

struct Document {
    title: String,
    contents: String,
}

impl Document {
    fn new(title: &str, contents: &str) -> Self {
        Self {
            title: title.to_string(),
            contents: contents.to_string(),
        }
    }
}

/// Everything the viewer knows, passed to the declaration each frame.
struct DocumentsApp {
    documents: Vec<Document>,
    selected: Cell<usize>,
    frame_count: u64,
}

impl DocumentsApp {
    fn new() -> Self {
        Self {
            documents: vec![
                Document::new(
                    "Squirrels",
                    "The Secret Life of Squirrels: Nature's Clever Acrobats\n\
                     Squirrels are often overlooked creatures, dismissed as mere park \
                     inhabitants or backyard nuisances. Yet, beneath their fluffy tails and \
                     twitching noses lies an intricate world of cunning, agility, and \
                     survival tactics that are nothing short of fascinating.",
                ),
                Document::new(
                    "Lorem Ipsum",
                    "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
                     tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim \
                     veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea \
                     commodo consequat.",
                ),
                Document::new(
                    "Vacuum Instructions",
                    "Chapter 3: Getting Started - Unpacking and Setup\n\n\
                     Congratulations on your new SuperClean Pro 5000 vacuum cleaner! In this \
                     section, we will guide you through the simple steps to get your vacuum \
                     up and running.",
                ),
                Document::new("Article 4", "Article 4"),
                Document::new("Article 5", "Article 5"),
            ],
            selected: Cell::new(0),
            frame_count: 0,
        }
    }

    /// Advance app time after a frame was presented.
    fn tick(&mut self) {
        self.frame_count += 1;
        if self.frame_count == 200 {
            self.documents[2] = Document::new(
                "Change-up",
                "Testing the dynamic ability of strings with runtime text!",
            );
        }
    }

    fn declare<'c>(&'c self, frame: &mut Frame<'c>) {
        let outer = ElementDecl::new()
            .id(ElementId::new("OuterContainer"))
            .background(BACKGROUND)
            .layout(
                LayoutConfig::default()
                    .sizing(Sizing::grow())
                    .padding(Padding::all(1))
                    .child_gap(1)
                    .direction(LayoutDirection::TopToBottom),
            );
        frame.element(outer, |f| {
            self.header(f);
            self.lower_content(f);
        });
    }

    fn header(&self, frame: &mut Frame<'_>) {
        let header = ElementDecl::new()
            .id(ElementId::new("HeaderBar"))
            .fill(FillConfig::new(CONTENT_BACKGROUND).corner_radius(1.0))
            .layout(
                LayoutConfig::default()
                    .sizing(Sizing::new(SizingAxis::grow(), SizingAxis::Fixed(3.0)))
                    .padding(Padding::axes(2, 0))
                    .child_gap(2)
                    .align(AlignX::Left, AlignY::Center),
            );
        frame.element(header, |f| {
            let file_button = ElementId::new("FileButton");
            let file_menu = ElementId::new("FileMenu");
            let decl = ElementDecl::new()
                .id(file_button)
                .layout(LayoutConfig::default().padding(Padding::axes(2, 0)))
                .fill(FillConfig::new(HEADER_BUTTON).corner_radius(1.0));
            f.element(decl, |f| {
                f.text("File", button_text());
                if f.is_hovered(file_button) || f.is_hovered(file_menu) {
                    file_menu_panel(f, file_menu);
                }
            });
            header_button(f, "Edit");
            f.leaf(ElementDecl::new().layout(
                LayoutConfig::default().sizing(Sizing::new(SizingAxis::grow(), SizingAxis::fit())),
            ));
            header_button(f, "Upload");
            header_button(f, "Media");
            header_button(f, "Support");
        });
    }

    fn lower_content<'c>(&'c self, frame: &mut Frame<'c>) {
        let lower = ElementDecl::new()
            .id(ElementId::new("LowerContent"))
            .layout(LayoutConfig::default().sizing(Sizing::grow()).child_gap(1));
        frame.element(lower, |f| {
            self.sidebar(f);
            self.main_content(f);
        });
    }

    fn sidebar<'c>(&'c self, frame: &mut Frame<'c>) {
        let sidebar = ElementDecl::new()
            .id(ElementId::new("Sidebar"))
            .fill(FillConfig::new(CONTENT_BACKGROUND).corner_radius(1.0))
            .layout(
                LayoutConfig::default()
                    .sizing(Sizing::new(SizingAxis::Fixed(24.0), SizingAxis::grow()))
                    .padding(Padding::all(1))
                    .child_gap(1)
                    .direction(LayoutDirection::TopToBottom),
            );
        frame.element(sidebar, |f| {
            for (index, document) in self.documents.iter().enumerate() {
                let id = ElementId::indexed("SidebarItem", index as u32);
                let layout = LayoutConfig::default()
                    .sizing(Sizing::new(SizingAxis::grow(), SizingAxis::fit()))
                    .padding(Padding::axes(1, 0));
                let mut decl = ElementDecl::new().id(id).layout(layout);
                if index == self.selected.get() {
                    decl = decl.background(SELECTED);
                } else if f.is_hovered(id) {
                    decl = decl.background(HOVERED);
                }

                let selected = &self.selected;
                f.element(decl, |f| {
                    f.on_hover(move |interaction: &Interaction| {
                        if interaction.pointer.state == PointerState::PressedThisFrame {
                            selected.set(index);
                        }
                    });
                    f.dynamic_text(&document.title, button_text());
                });
            }
        });
    }

    fn main_content(&self, frame: &mut Frame<'_>) {
        let content = ElementDecl::new()
            .id(ElementId::new("MainContent"))
            .fill(FillConfig::new(CONTENT_BACKGROUND).corner_radius(1.0))
            .scroll(ScrollConfig::vertical())
            .layout(
                LayoutConfig::default()
                    .sizing(Sizing::grow())
                    .padding(Padding::all(1))
                    .child_gap(1)
                    .direction(LayoutDirection::TopToBottom),
            );
        let Some(document) = self.documents.get(self.selected.get()) else {
            return;
        };
        frame.element(content, |f| {
            f.dynamic_text(&document.title, document_text());
            f.dynamic_text(&document.contents, document_text());
        });
    }
}

fn button_text() -> TextStyle {
    TextStyle::default().color(Rgba::WHITE).font(0, 16)
}

fn document_text() -> TextStyle {
    TextStyle::default().color(Rgba::WHITE).font(0, 24)
}

fn header_button(frame: &mut Frame<'_>, label: &'static str) {
    let decl = ElementDecl::new()
        .layout(LayoutConfig::default().padding(Padding::axes(2, 0)))
        .fill(FillConfig::new(HEADER_BUTTON).corner_radius(1.0));
    frame.element(decl, |f| f.text(label, button_text()));
}

fn file_menu_panel(frame: &mut Frame<'_>, id: ElementId) {
    let panel = ElementDecl::new()
        .id(id)
        .floating(FloatingConfig::default().attach(AttachPoint::LeftTop, AttachPoint::LeftBottom))
        .layout(LayoutConfig::default().padding(Padding::axes(0, 1)));
    frame.element(panel, |f| {
        let items = ElementDecl::new()
            .fill(FillConfig::new(MENU_BACKGROUND).corner_radius(1.0))
            .layout(
                LayoutConfig::default()
                    .sizing(Sizing::new(SizingAxis::Fixed(20.0), SizingAxis::fit()))
                    .direction(LayoutDirection::TopToBottom),
            );
        f.element(items, |f| {
            for label in ["New", "Open", "Close"] {
                let item = ElementDecl::new().layout(LayoutConfig::default().padding(Padding::axes(2, 1)));
                f.element(item, |f| f.text(label, button_text()));
            }
        });
    });
}

fn init_logging() -> io::Result<()> {
    let file = File::create("documents.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn is_quit(event: &Event) -> bool {
    match event {
        Event::Key(KeyEvent {
            code, modifiers, ..
        }) => {
            matches!(code, KeyCode::Char('q') | KeyCode::Esc)
                || (*code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
        }
        _ => false,
    }
}

/// Arrow and page keys scroll the content pane.
fn handle_key(ctx: &mut Context, event: &Event) {
    let Event::Key(KeyEvent { code, .. }) = event else {
        return;
    };
    let content = ElementId::new("MainContent");
    let scroll = ctx.scroll_mut();
    match code {
        KeyCode::Down => {
            scroll.scroll_lines(content, 1.0);
        }
        KeyCode::Up => {
            scroll.scroll_lines(content, -1.0);
        }
        KeyCode::PageDown => {
            scroll.scroll_pages(content, 1.0);
        }
        KeyCode::PageUp => {
            scroll.scroll_pages(content, -1.0);
        }
        KeyCode::Home => scroll.scroll_to_top(content),
        KeyCode::End => scroll.scroll_to_bottom(content),
        _ => {}
    }
}

fn run(
    app: &mut DocumentsApp,
    ctx: &mut Context,
    tracker: &mut InputTracker,
    presenter: &mut TerminalPresenter<io::Stdout>,
) -> io::Result<()> {
    loop {
        let mut timeout = FRAME_INTERVAL;
        while let Some(event) = poll_event(timeout)? {
            if is_quit(&event) {
                return Ok(());
            }
            if let Event::Resize(..) = event {
                presenter.invalidate();
            }
            handle_key(ctx, &event);
            tracker.handle(&event);
            timeout = Duration::ZERO;
        }

        {
            let mut frame = ctx.begin_frame(tracker.snapshot());
            app.declare(&mut frame);
            // Errors already went to the diagnostic sink; skip drawing this frame.
            if let Ok(output) = frame.end() {
                presenter.present(&output)?;
            }
        }
        app.tick();
    }
}

fn main() -> io::Result<()> {
    init_logging()?;
    let (width, height) = terminal::size()?;
    let mut tracker = InputTracker::new(width, height);
    let mut ctx = Context::new(ContextConfig::default());
    let mut presenter = TerminalPresenter::stdout().with_background(BACKGROUND);
    let mut app = DocumentsApp::new();

    presenter.enter()?;
    let result = run(&mut app, &mut ctx, &mut tracker, &mut presenter);
    presenter.leave()?;
    result
}
