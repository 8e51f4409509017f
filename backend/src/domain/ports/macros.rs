//! Helper macros for domain port error enums.

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

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*)
        $field:ident : $ty:ty, $($rest:tt)*) => {
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
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

/// Map a repository error with `Connection` and `Query` variants into the
/// domain [`Error`](crate::domain::Error).
///
/// Lost connections become `service_unavailable`; failed statements become
/// `gateway_failure`. The adapter message is logged at debug level and kept
/// out of the caller-facing text.
macro_rules! persistence_error_into_domain {
    ($name:ident => $label:literal) => {
        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                ::tracing::debug!(error = %error, concat!($label, " failure"));
                match error {
                    $name::Connection { .. } => {
                        $crate::domain::Error::service_unavailable(concat!($label, " unavailable"))
                    }
                    $name::Query { .. } => {
                        $crate::domain::Error::gateway_failure(concat!($label, " error"))
                    }
                }
            }
        }
    };
}

pub(crate) use define_port_error;
pub(crate) use persistence_error_into_domain;

#[cfg(test)]
mod tests {
    use crate::domain::ErrorCode;

    define_port_error! {
        pub enum ExamplePortError {
            Connection { message: String } => "connection: {message}",
            Query { message: String } => "query: {message}",
            Rejected { status: u16, message: String } => "rejected {status}: {message}",
        }
    }

    // Only Connection/Query are mapped; the extra variant exercises the
    // generic constructor arm.
    mod mapped {
        define_port_error! {
            pub enum MappedError {
                Connection { message: String } => "connection: {message}",
                Query { message: String } => "query: {message}",
            }
        }
        persistence_error_into_domain!(MappedError => "example repository");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExamplePortError::connection("refused");
        assert_eq!(err.to_string(), "connection: refused");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExamplePortError::rejected(403_u16, "signature mismatch");
        assert_eq!(err.to_string(), "rejected 403: signature mismatch");
    }

    #[test]
    fn connection_errors_become_service_unavailable() {
        let err: crate::domain::Error = mapped::MappedError::connection("pool closed").into();
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.message(), "example repository unavailable");
    }

    #[test]
    fn query_errors_become_gateway_failures() {
        let raw = ExamplePortError::query("syntax");
        assert_eq!(raw.to_string(), "query: syntax");

        let err: crate::domain::Error = mapped::MappedError::query("syntax").into();
        assert_eq!(err.code(), ErrorCode::GatewayFailure);
        assert!(!err.message().contains("syntax"));
    }
}
