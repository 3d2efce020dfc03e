//! Handle minting for objects passed without an explicit name.

use std::fmt;

/// Prefix of every minted handle.
pub const HANDLE_PREFIX: &str = "__ueberMan";

/// What a handle names. Each kind counts independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandleKind {
    Shader = 0,
    Light = 1,
    Look = 2,
    Space = 3,
    Object = 4,
    ShaderTree = 5,
    ShaderNode = 6,
    Camera = 7,
}

impl HandleKind {
    const COUNT: usize = 8;

    pub const fn name(self) -> &'static str {
        match self {
            Self::Shader => "Shader",
            Self::Light => "Light",
            Self::Look => "Look",
            Self::Space => "Space",
            Self::Object => "Object",
            Self::ShaderTree => "ShaderTree",
            Self::ShaderNode => "ShaderNode",
            Self::Camera => "Camera",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Monotonic per-kind counters. Handles are never reused within the
/// lifetime of the minter, not even across scenes.
#[derive(Clone, Debug, Default)]
pub struct HandleMinter {
    counters: [u64; HandleKind::COUNT],
}

impl HandleMinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh handle of the form `__ueberMan<Kind><Counter>`.
    pub fn mint(&mut self, kind: HandleKind) -> String {
        let slot = &mut self.counters[kind as usize];
        let handle = format!("{HANDLE_PREFIX}{}{}", kind.name(), *slot);
        *slot += 1;
        handle
    }

    /// `handle` itself when non-empty, else a fresh one.
    pub fn resolve(&mut self, kind: HandleKind, handle: &str) -> String {
        if handle.is_empty() {
            self.mint(kind)
        } else {
            handle.to_string()
        }
    }
}
