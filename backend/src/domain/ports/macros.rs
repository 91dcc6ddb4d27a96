//! Helper macro for port error enums that surface as domain errors.
//!
//! Each variant names the [`ErrorCode`](crate::domain::ErrorCode) it maps
//! to. The macro generates snake-case constructors, a `code()` accessor and
//! a `From` conversion into [`Error`](crate::domain::Error) that copies the
//! variant's fields into the error metadata.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $code:ident, $message:literal
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
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Domain error code this failure surfaces as.
            pub fn code(&self) -> $crate::domain::ErrorCode {
                match self {
                    $( Self::$variant { .. } => $crate::domain::ErrorCode::$code, )*
                }
            }
        }

        impl From<$name> for $crate::domain::Error {
            fn from(err: $name) -> Self {
                let error = $crate::domain::Error::new(err.code(), err.to_string());
                match err {
                    $(
                        $name::$variant $( { $($field),* } )? => error
                            $( $( .with_meta(stringify!($field), ::serde_json::json!($field)) )* )?,
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::{Error, ErrorCode};

    define_port_error! {
        pub enum ExamplePortError {
            Missing { key: String } => NotFound, "missing: {key}",
            Clash { key: String, count: u32 } => Unprocessable, "clash: {key} ({count})",
            Offline => ServiceUnavailable, "offline",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExamplePortError::missing("alpha");
        assert_eq!(err.to_string(), "missing: alpha");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn conversion_copies_fields_into_metadata() {
        let err: Error = ExamplePortError::clash("alpha", 2_u32).into();
        assert_eq!(err.code(), ErrorCode::Unprocessable);
        assert_eq!(err.message(), "clash: alpha (2)");
        assert_eq!(err.metadata()["key"], "alpha");
        assert_eq!(err.metadata()["count"], 2);
    }

    #[test]
    fn unit_variants_convert_without_metadata() {
        let err: Error = ExamplePortError::offline().into();
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert!(err.is_reportable());
        assert!(err.metadata().is_empty());
    }
}
