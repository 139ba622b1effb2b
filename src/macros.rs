//! Declarative helpers for XDR type definitions.

/// Define an XDR enum: a `#[repr(i32)]` Rust enum plus its [`XdrEnum`] and
/// [`XdrType`] impls. The first variant is the default.
///
/// ```rust
/// stellar_txrep::xdr_enum! {
///     pub enum Color {
///         Red = 0 => "RED",
///         Green = 1 => "GREEN",
///     }
/// }
/// assert_eq!(Color::from_symbol("GREEN"), Some(Color::Green));
/// ```
///
/// [`XdrEnum`]: crate::core::marshal::XdrEnum
/// [`XdrType`]: crate::core::marshal::XdrType
#[macro_export]
macro_rules! xdr_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])*
            $first:ident = $first_value:literal => $first_symbol:literal
            $(,
                $(#[$variant_meta:meta])*
                $variant:ident = $value:literal => $symbol:literal
            )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(i32)]
        $vis enum $name {
            $(#[$first_meta])*
            #[default]
            $first = $first_value,
            $(
                $(#[$variant_meta])*
                $variant = $value,
            )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$name::$first $(, $name::$variant)*];

            pub fn from_i32(value: i32) -> Option<Self> {
                Self::ALL.iter().copied().find(|e| *e as i32 == value)
            }

            pub fn from_symbol(symbol: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|e| e.name() == symbol)
            }

            pub fn name(self) -> &'static str {
                match self {
                    $name::$first => $first_symbol,
                    $($name::$variant => $symbol,)*
                }
            }
        }

        impl $crate::core::marshal::XdrEnum for $name {
            fn value(&self) -> i32 {
                *self as i32
            }

            fn set_value(&mut self, value: i32) -> bool {
                match Self::from_i32(value) {
                    Some(e) => {
                        *self = e;
                        true
                    }
                    None => false,
                }
            }

            fn symbol(&self) -> &'static str {
                self.name()
            }

            fn set_symbol(&mut self, symbol: &str) -> bool {
                match Self::from_symbol(symbol) {
                    Some(e) => {
                        *self = e;
                        true
                    }
                    None => false,
                }
            }

            fn symbols(&self) -> Vec<&'static str> {
                Self::ALL.iter().map(|e| e.name()).collect()
            }
        }

        impl $crate::core::marshal::XdrType for $name {
            fn as_value(&mut self) -> $crate::core::marshal::XdrValue<'_> {
                $crate::core::marshal::XdrValue::Scalar($crate::core::marshal::Scalar::Enum(self))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Define an XDR struct. Each field names the key it marshals under.
///
/// ```rust
/// stellar_txrep::xdr_struct! {
///     pub struct Range {
///         low: u32 => "low",
///         high_water: u32 => "highWater",
///     }
/// }
/// let r = Range { low: 1, high_water: 2 };
/// assert_eq!(r.high_water, 2);
/// ```
#[macro_export]
macro_rules! xdr_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty => $key:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $crate::core::marshal::XdrAggregate for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            #[allow(unused_variables)]
            fn marshal(
                &mut self,
                v: &mut dyn $crate::core::marshal::Visitor,
                name: &str,
            ) -> $crate::error::Result<()> {
                $( $crate::core::marshal::field(v, name, $key, &mut self.$field)?; )*
                Ok(())
            }
        }

        impl $crate::core::marshal::XdrType for $name {
            fn as_value(&mut self) -> $crate::core::marshal::XdrValue<'_> {
                $crate::core::marshal::XdrValue::Aggregate(self)
            }
        }
    };
}
