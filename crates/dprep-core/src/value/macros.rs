//! Macros utilitarias para construir argumentos y enums de wire.
//!
//! Exportadas en la raíz del crate:
//!   use dprep_core::{args, wire_enum};

/// Construye un `Arguments` ordenado a partir de pares `"clave" => valor`.
///
/// El orden de inserción se conserva (el engine lo usa para la identidad del
/// step), por lo que la macro inserta en el orden escrito.
///
/// ```ignore
/// let a = args! { "count" => 10i64, "seed" => Value::Null };
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::value::Arguments::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::Arguments::new();
        $( map.insert(::std::string::String::from($key), $crate::value::Value::from($value)); )+
        map
    }};
}

/// Declara un enum con discriminantes enteros que viaja al engine como
/// `Value::Long`.
///
/// Genera: `Debug/Clone/Copy/PartialEq/Eq/Hash`, `code()`, `from_code()` y
/// `From<Enum> for Value`.
#[macro_export]
macro_rules! wire_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name { $($(#[$vmeta])* $variant),+ }

        impl $name {
            /// Código entero enviado al engine.
            pub fn code(self) -> i64 {
                match self { $($name::$variant => $code),+ }
            }

            /// Inverso de `code`.
            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $(c if c == $code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<$name> for $crate::value::Value {
            fn from(v: $name) -> Self { $crate::value::Value::Long(v.code()) }
        }
    };
}
