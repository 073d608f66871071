//! Typed resource handles.
//!
//! Every registry category gets its own newtype so that a mesh handle can
//! never be passed where a material handle is expected.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw integer value of the handle.
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle of an [`Entity`](crate::scene::Entity).
    EntityHandle,
    "Entity"
);
define_handle!(
    /// Handle of a [`Mesh`](crate::resources::Mesh).
    MeshHandle,
    "Mesh"
);
define_handle!(
    /// Handle of a [`Material`](crate::resources::Material).
    MaterialHandle,
    "Material"
);
define_handle!(
    /// Handle of a [`Light`](crate::scene::Light).
    LightHandle,
    "Light"
);
define_handle!(
    /// Handle of a [`Shader`](crate::resources::Shader).
    ShaderHandle,
    "Shader"
);

impl MaterialHandle {
    /// The built-in colour material registered at construction.
    pub const DEFAULT: Self = Self(0);
}

impl ShaderHandle {
    /// The built-in G-buffer shader registered at construction.
    pub const DEFAULT: Self = Self(0);
}
