use crate::catalog::Catalog;
use crate::events::MouseButton;
use crate::layout::Layout;
use crate::mode::{Command, UiMode};
use crate::scene::{ElementKey, EventArgs, EventKind, RenderList};

/// Everything a widget callback may touch.
///
/// Callbacks never reach the host or the network; they change the scene and
/// the mode directly and queue a `Command` for the rest.
pub struct UiContext<'a> {
    pub scene: &'a mut RenderList,
    pub mode: &'a mut UiMode,
    pub layout: &'a Layout,
    pub catalog: &'a Catalog,
    commands: &'a mut Vec<Command>,
}

impl<'a> UiContext<'a> {
    pub fn new(
        scene: &'a mut RenderList,
        mode: &'a mut UiMode,
        layout: &'a Layout,
        catalog: &'a Catalog,
        commands: &'a mut Vec<Command>,
    ) -> Self {
        Self {
            scene,
            mode,
            layout,
            catalog,
            commands,
        }
    }

    pub fn emit(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    pub fn coarse_pointer(&self) -> bool {
        self.mode.coarse_pointer
    }

    /// Runs `key`'s binding for `kind` right now. Returns false when the
    /// element is gone or has nothing bound.
    pub fn trigger(&mut self, key: ElementKey, kind: EventKind, button: Option<MouseButton>) -> bool {
        let Some(cb) = self.scene.get(key).and_then(|el| el.binding(kind)) else {
            return false;
        };
        cb(
            self,
            EventArgs {
                target: key,
                kind,
                button,
                position: None,
            },
        );
        true
    }

    pub fn trigger_by_id(&mut self, id: &str, kind: EventKind, button: Option<MouseButton>) -> bool {
        match self.scene.get_by_id(id).map(|el| el.key()) {
            Some(key) => self.trigger(key, kind, button),
            None => false,
        }
    }
}
