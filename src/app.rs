//! The notebook viewer controller
//!
//! Owns the single [`ViewState`], routes messages to transition handlers and
//! re-renders declaratively. Every handler invocation ends with at most one
//! render; a `raw` message defers its recompute to the next [`settle`].
//!
//! [`settle`]: NotebookViewer::settle

use crate::error::{Capability, RenderError};
use crate::host::Host;
use crate::message::{Command, ContentOption, ContentOptions, InitPayload, Message};
use crate::notebook::NotebookParser;
use crate::render::Capabilities;
use crate::state::{RenderedDocument, ViewState};
use crate::view::{self, Page};

/// Notebook viewer controller
pub struct NotebookViewer<H: Host> {
    /// Single source of truth for the view
    state: ViewState,

    /// Rendering services
    capabilities: Capabilities,

    /// Parser bound to the current compiler and content options
    parser: NotebookParser,

    /// Host the page is presented to
    host: H,

    /// Page the view is patched into
    page: Page,

    /// State changed since the last render
    dirty: bool,

    render_count: u64,
}

impl<H: Host> NotebookViewer<H> {
    /// Parse the payload's document once and render the first page
    pub fn init(payload: InitPayload, capabilities: Capabilities, host: H) -> Self {
        log::info!(
            "Initializing viewer: theme={}, compiler={}, {} bytes of source",
            payload.theme,
            payload.compiler,
            payload.raw.len()
        );

        let parser = NotebookParser::new(&capabilities, &payload.compiler, &payload.content);
        let mut state = ViewState::from_payload(payload);
        state.rendered_document = RenderedDocument::compute(&state.source, &parser);

        let page = host.page();
        let mut viewer = Self {
            state,
            capabilities,
            parser,
            host,
            page,
            dirty: true,
            render_count: 0,
        };
        viewer.render_if_dirty();
        viewer
    }

    /// Handle one inbound message
    pub fn update(&mut self, message: Message) -> Command {
        log::debug!("Handling {} message", message.kind());
        match message {
            Message::Reload => Command::Restart,
            Message::Autoreload => Command::CancelAutoreload,
            Message::Theme { theme } => {
                self.transition(|state| state.theme = theme);
                Command::None
            }
            Message::Themes { themes } => {
                self.transition(|state| state.themes = themes);
                Command::None
            }
            Message::Raw { raw } => {
                self.transition(|state| {
                    state.source = raw;
                    state.pending_reload = true;
                });
                Command::None
            }
        }
    }

    /// Run one transition handler, then render once
    ///
    /// A change of content options or compiler recomputes the rendered
    /// document from the latest source in the same pass.
    pub fn transition<F>(&mut self, handler: F)
    where
        F: FnOnce(&mut ViewState),
    {
        let options = self.state.content_options;
        let compiler = self.state.compiler.clone();

        handler(&mut self.state);
        self.dirty = true;

        if self.state.content_options != options || self.state.compiler != compiler {
            log::debug!("Rendering options changed, recomputing document");
            self.parser = NotebookParser::new(
                &self.capabilities,
                &self.state.compiler,
                &self.state.content_options,
            );
            self.recompute();
        }

        self.render_if_dirty();
    }

    /// Perform a deferred recompute, if one is pending
    pub fn settle(&mut self) {
        if !self.state.pending_reload {
            return;
        }
        log::debug!("Settling pending source update");
        self.recompute();
        self.dirty = true;
        self.render_if_dirty();
    }

    pub fn set_raw_mode(&mut self, enabled: bool) {
        self.transition(|state| state.raw_mode_enabled = enabled);
    }

    pub fn toggle_raw_mode(&mut self) {
        self.set_raw_mode(!self.state.raw_mode_enabled);
    }

    pub fn set_content_options(&mut self, options: ContentOptions) {
        self.transition(|state| state.content_options = options);
    }

    /// Flip a single content option
    pub fn toggle_content_option(&mut self, option: ContentOption) {
        self.set_content_options(self.state.content_options.toggled(option));
    }

    /// Re-render without a state change, e.g. after a host preference change
    pub fn redraw(&mut self) {
        self.dirty = true;
        self.render_if_dirty();
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Number of renders since init
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    fn recompute(&mut self) {
        self.state.rendered_document = RenderedDocument::compute(&self.state.source, &self.parser);
        self.state.pending_reload = false;
    }

    fn render_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let view = view::view(&self.state, self.host.prefers_dark());
        let outcome = self.page.patch(&view);
        self.render_count += 1;
        log::debug!("Render #{}: {:?}", self.render_count, outcome);

        if outcome.content_replaced {
            self.enhance_content();
        }
        if outcome.content_replaced || outcome.outline_replaced {
            self.page.set_outline_visible(self.state.outline_visible());
        }

        self.host.present(&self.page);
    }

    /// Run the passes a freshly replaced content region asks for
    fn enhance_content(&mut self) {
        let (mut html, enhancements) = match self.page.content() {
            Some(region) => (region.html().to_string(), region.enhancements()),
            None => return,
        };
        self.page.set_content_visible(false);

        if enhancements.highlight {
            match self.capabilities.highlighter() {
                Some(highlighter) => html = highlighter.highlight_region(&html),
                None => log::warn!("{}", RenderError::CapabilityMissing(Capability::Highlighter)),
            }
        }
        if enhancements.math {
            match self.capabilities.math() {
                Some(math) => html = math.typeset_region(&html),
                None => log::warn!("{}", RenderError::CapabilityMissing(Capability::Math)),
            }
        }

        self.page.set_content_html(html);
        self.page.set_content_visible(true);
    }
}
