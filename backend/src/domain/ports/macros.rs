//! `define_port_error!`: declares an adapter error enum together with one
//! snake_case constructor per variant.
//!
//! Every variant carries named fields. Constructor parameters take
//! `impl Into<T>` so call sites can pass `&str` for `String` fields.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Build a [`" $name "::" $variant "`]."]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum RelayError {
            Refused { message: String } => "relay refused: {message}",
            Status { code: u16 } => "relay answered {code}",
            Bounced { address: String, code: u16 } => "{address} bounced with {code}",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(RelayError::refused("quota").to_string(), "relay refused: quota");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(RelayError::status(421_u16), RelayError::Status { code: 421 });
    }

    #[test]
    fn fields_are_passed_in_declaration_order() {
        let err = RelayError::bounced("grace@outlook.com", 550_u16);
        assert_eq!(err.to_string(), "grace@outlook.com bounced with 550");
    }
}
