/*!
Java reference types for declared parameter and return types.

`Function<A, R>` can only be parameterized with reference types, so
primitives are boxed before they appear in a type argument.
*/

/// Type argument used for "no value": no parameters, or a `void` return
pub const UNIT: &str = "Void";

/// Boxed form of a primitive, or `None` for anything else
pub fn box_primitive(name: &str) -> Option<&'static str> {
    let boxed = match name {
        "boolean" => "Boolean",
        "byte" => "Byte",
        "char" => "Character",
        "short" => "Short",
        "int" => "Integer",
        "long" => "Long",
        "float" => "Float",
        "double" => "Double",
        "void" => UNIT,
        _ => return None,
    };
    Some(boxed)
}

/// Reference type usable as a type argument for `declared`.
///
/// Array types box their element type and keep their dimensions, so
/// `int [][]` becomes `Integer[][]`.
pub fn boxed_type(declared: &str) -> String {
    let (element, dimensions) = split_dimensions(declared);
    let element = box_primitive(element).unwrap_or(element);
    format!("{element}{}", "[]".repeat(dimensions))
}

/// Whether `declared` stands for "returns nothing"
pub fn is_unit(declared: &str) -> bool {
    matches!(declared.trim(), "void" | UNIT)
}

/// Strip trailing `[]` pairs (whitespace allowed inside and between them)
fn split_dimensions(declared: &str) -> (&str, usize) {
    let mut rest = declared.trim();
    let mut dimensions = 0;
    while let Some(open) = rest.strip_suffix(']').map(str::trim_end) {
        let Some(element) = open.strip_suffix('[') else {
            break;
        };
        rest = element.trim_end();
        dimensions += 1;
    }
    (rest, dimensions)
}
