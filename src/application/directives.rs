// Directive handlers - ordered chain applying parsed response directives
use crate::application::collaborators::Ui;
use crate::application::document::Document;
use crate::application::notifications::NotificationManager;
use crate::application::registry::RequestRegistry;
use crate::domain::directives::{ResponseDirectives, Retarget};
use crate::domain::request::PendingRequest;
use crate::domain::region::RegionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop handling the response; nothing gets rendered.
    Discard,
}

/// State shared by the handlers of one response.
pub struct DirectiveContext<'a> {
    pub request: &'a PendingRequest,
    /// Region the response ends up in; starts as the requested region.
    pub target: Option<RegionId>,
    pub retargeted: bool,
    pub document: &'a dyn Document,
    pub ui: &'a dyn Ui,
    pub notices: &'a mut NotificationManager,
    pub registry: &'a mut RequestRegistry,
}

pub trait DirectiveHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow;
}

pub struct DirectiveChain {
    handlers: Vec<Box<dyn DirectiveHandler>>,
}

impl Default for DirectiveChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(NotificationHandler),
            Box::new(RetargetHandler),
            Box::new(ModuleHandler),
            Box::new(CssReloadHandler),
            Box::new(TitleHandler),
            Box::new(RefreshHandler),
            Box::new(WindowIdHandler),
        ])
    }
}

impl DirectiveChain {
    pub fn new(handlers: Vec<Box<dyn DirectiveHandler>>) -> Self {
        Self { handlers }
    }

    pub fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        for handler in &self.handlers {
            if handler.apply(directives, ctx) == Flow::Discard {
                tracing::debug!(
                    "Response for {} discarded by {} directive",
                    ctx.request.url,
                    handler.name()
                );
                return Flow::Discard;
            }
        }
        Flow::Continue
    }
}

pub struct NotificationHandler;

impl DirectiveHandler for NotificationHandler {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        if let Some(notification) = &directives.notification {
            ctx.notices
                .create_notice(notification.severity.clone(), &notification.message, false);
        }
        Flow::Continue
    }
}

pub struct RetargetHandler;

impl DirectiveHandler for RetargetHandler {
    fn name(&self) -> &'static str {
        "container"
    }

    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        match &directives.retarget {
            None => Flow::Continue,
            Some(Retarget::Ignore) => Flow::Discard,
            Some(Retarget::Container(region)) => {
                // The original region is done waiting even though the
                // content goes elsewhere.
                if let Some(original) = &ctx.request.region {
                    ctx.registry.release(original, ctx.request.id);
                }
                if !ctx.document.contains(region) {
                    tracing::warn!("Server asked for unknown container {}, dropping response", region);
                    return Flow::Discard;
                }
                ctx.target = Some(region.clone());
                ctx.retargeted = true;
                Flow::Continue
            }
        }
    }
}

pub struct ModuleHandler;

impl DirectiveHandler for ModuleHandler {
    fn name(&self) -> &'static str {
        "module"
    }

    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        if let Some(target) = &ctx.target {
            ctx.document.set_module(target, directives.module.as_deref());
        }
        Flow::Continue
    }
}

pub struct CssReloadHandler;

impl DirectiveHandler for CssReloadHandler {
    fn name(&self) -> &'static str {
        "css-reload"
    }

    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        if directives.css_reload {
            ctx.ui.reload_css();
        }
        Flow::Continue
    }
}

pub struct TitleHandler;

impl DirectiveHandler for TitleHandler {
    fn name(&self) -> &'static str {
        "title"
    }

    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        if let Some(title) = &directives.title {
            let in_dashboard = ctx
                .target
                .as_ref()
                .is_some_and(|target| ctx.document.in_dashboard(target));
            if !in_dashboard {
                ctx.ui.set_title(title);
            }
        }
        Flow::Continue
    }
}

pub struct RefreshHandler;

impl DirectiveHandler for RefreshHandler {
    fn name(&self) -> &'static str {
        "refresh"
    }

    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        if let Some(target) = &ctx.target {
            match directives.refresh_secs {
                Some(secs) => ctx.document.set_refresh_interval(target, secs),
                None => ctx.document.set_last_update(target, None),
            }
        }
        Flow::Continue
    }
}

pub struct WindowIdHandler;

impl DirectiveHandler for WindowIdHandler {
    fn name(&self) -> &'static str {
        "window-id"
    }

    fn apply(&self, directives: &ResponseDirectives, ctx: &mut DirectiveContext<'_>) -> Flow {
        if let Some(window_id) = &directives.window_id {
            ctx.ui.set_window_id(window_id);
        }
        Flow::Continue
    }
}
