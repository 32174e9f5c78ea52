/// Defines a `Ustr`-backed identifier newtype with the common trait impls every
/// identifier in this module needs: `Display`, `Debug`, string conversions, and
/// serde-as-string.
macro_rules! identifier {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[repr(C)]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ustr::Ustr);

        impl $name {
            /// Creates a new identifier from `value`.
            ///
            /// # Panics
            ///
            /// Panics if `value` is empty or contains whitespace. Use
            /// [`TryFrom`] at boundaries where a panic is not acceptable.
            #[must_use]
            pub fn new<T: AsRef<str>>(value: T) -> Self {
                let value = value.as_ref();
                ironclad_core::correctness::check_valid_string(value, stringify!($name))
                    .unwrap_or_else(|e| panic!("{e}"));
                Self(ustr::Ustr::from(value))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ironclad_core::correctness::CorrectnessError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                ironclad_core::correctness::check_valid_string(value, stringify!($name))?;
                Ok(Self(ustr::Ustr::from(value)))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(\"{}\")", stringify!($name), self.0)
            }
        }
    };
}

pub(crate) use identifier;
