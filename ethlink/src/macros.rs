/// Define an enumeration with known variants and an unknown representation.
///
/// Link-layer metadata fields (hardware types, packet origins) reserve a
/// handful of well-known values while the rest of the numeric range stays
/// open. This macro defines such a field as an enum with an `Unknown`
/// catch-all and the conversions from and into the underlying
/// representation.
// Copyright (C) 2016 whitequark@whitequark.org
macro_rules! enum_with_unknown {
    (
        $( #[$enum_attr:meta] )*
        pub enum $name:ident($ty:ty) {
            $(
              $( #[$variant_attr:meta] )*
              $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
        $( #[$enum_attr] )*
        pub enum $name {
            $(
              $( #[$variant_attr] )*
              $variant,
            )*
            /// A value outside the set of well-known ones.
            ///
            /// Either parsed from a source speaking some unsupported
            /// standard, or chosen deliberately by a caller to tag traffic
            /// with a value of its own.
            Unknown($ty),
        }

        impl ::core::convert::From<$ty> for $name {
            fn from(value: $ty) -> Self {
                match value {
                    $( $value => $name::$variant, )*
                    other => $name::Unknown(other),
                }
            }
        }

        impl ::core::convert::From<$name> for $ty {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value, )*
                    $name::Unknown(other) => other,
                }
            }
        }
    }
}
