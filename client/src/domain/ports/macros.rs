//! `define_port_error!`, the declaration form shared by adapter-facing
//! error enums such as [`BackendError`](super::BackendError) and
//! [`ExpirySlotError`](super::ExpirySlotError).
//!
//! Each variant is written as `Name { field: Type } => "display text"`. The
//! macro derives `thiserror::Error` with that text and adds one snake-case
//! constructor per variant whose arguments take `impl Into<Type>`, so
//! adapters can write `BackendError::unavailable("offline")`.

macro_rules! define_port_error {
    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@collect $variant () () $( $field : $ty, )*);
    };

    // Accumulates `field: impl Into<Type>` parameters and their `.into()`
    // initialisers one field at a time.
    (@collect $variant:ident ($($args:tt)*) ($($fields:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($args)*) -> Self {
                Self::$variant { $($fields)* }
            }
        }
    };

    (@collect $variant:ident ($($args:tt)*) ($($fields:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @collect
            $variant
            ($($args)* $field: impl Into<$ty>,)
            ($($fields)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
