//! Conversions between Java source-level type names and JNI type signatures.

use crate::error::{Error, Result};

/// `java.lang.String` to `Ljava/lang/String;`.
pub fn class_to_signature(class: &str) -> String {
    format!("L{};", class.replace('.', "/"))
}

/// `Ljava/lang/String;` to `java.lang.String`.
///
/// Only class signatures are accepted, anything not starting with `L` is an
/// error.
pub fn signature_to_class(signature: &str) -> Result<String> {
    let Some(body) = signature.strip_prefix('L') else {
        return Err(Error::MalformedSignature(signature.to_owned()));
    };
    let body = body.strip_suffix(';').unwrap_or(body);
    Ok(body.replace('/', "."))
}

/// The package prefix of a class signature as a relative directory, e.g.
/// `com/example` for `Lcom/example/Main;`, or an empty string for the default
/// package.
pub fn package_path(signature: &str) -> Result<&str> {
    let Some(body) = signature.strip_prefix('L') else {
        return Err(Error::MalformedSignature(signature.to_owned()));
    };
    Ok(body.rfind('/').map_or("", |slash| &body[..slash]))
}

fn primitive(name: &str) -> Option<char> {
    Some(match name {
        "boolean" => 'Z',
        "byte" => 'B',
        "char" => 'C',
        "short" => 'S',
        "int" => 'I',
        "long" => 'J',
        "float" => 'F',
        "double" => 'D',
        "void" => 'V',
        _ => return None,
    })
}

/// The signature of a source-level type name such as `int`, `String[][]` or
/// `java.util.List`.
pub fn type_signature(name: &str) -> String {
    let mut base = name.trim();
    let mut signature = String::new();
    while let Some(element) = base.strip_suffix("[]") {
        signature.push('[');
        base = element.trim_end();
    }
    match primitive(base) {
        Some(tag) => signature.push(tag),
        None => signature.push_str(&class_to_signature(base)),
    }
    signature
}

/// A method signature like `(ILjava/lang/String;)V`.
pub fn method_signature<S: AsRef<str>>(return_type: &str, arg_types: &[S]) -> String {
    let args: String = arg_types
        .iter()
        .map(|arg| type_signature(arg.as_ref()))
        .collect();
    format!("({args}){}", type_signature(return_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names() {
        assert_eq!(class_to_signature("java.lang.String"), "Ljava/lang/String;");
        assert_eq!(class_to_signature("Main"), "LMain;");
        assert_eq!(signature_to_class("Lcom/example/Main;").unwrap(), "com.example.Main");
    }

    #[test]
    fn non_class_signature_is_rejected() {
        let err = signature_to_class("[I").unwrap_err();
        assert!(matches!(err, Error::MalformedSignature(s) if s == "[I"));
        assert!(package_path("I").is_err());
    }

    #[test]
    fn class_signatures_survive_a_round_trip() {
        for signature in [
            "LMain;",
            "Ljava/lang/String;",
            "Lcom/example/deeply/nested/Outer$Inner;",
            "La;",
        ] {
            let class = signature_to_class(signature).unwrap();
            assert_eq!(class_to_signature(&class), signature);
        }
    }

    #[test]
    fn packages() {
        assert_eq!(package_path("Lcom/example/Main;").unwrap(), "com/example");
        assert_eq!(package_path("LMain;").unwrap(), "");
    }

    #[test]
    fn method_signatures() {
        assert_eq!(method_signature::<&str>("void", &[]), "()V");
        assert_eq!(
            method_signature("int", &["java.lang.String", "long", "boolean"]),
            "(Ljava/lang/String;JZ)I"
        );
        assert_eq!(
            method_signature("java.lang.String[]", &["int[][]", "char []"]),
            "([[I[C)[Ljava/lang/String;"
        );
    }
}
