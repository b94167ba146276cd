//! Types every registry knows without being told
//!
//! The capability roots (`Provider<T>`, `Map<K, V>`, `Iterable<T>`, `Named`),
//! the standard collections and the scalar leaf types.

use super::TypeDeclaration;
use crate::constants::{
    TYPE_BOOL, TYPE_F64, TYPE_I32, TYPE_I64, TYPE_ITERABLE, TYPE_LIST, TYPE_MAP, TYPE_NAMED,
    TYPE_PROVIDER, TYPE_SET, TYPE_STRING, TYPE_U32, TYPE_U64,
};

const SCALAR_TYPES: [&str; 7] = [
    TYPE_STRING,
    TYPE_BOOL,
    TYPE_I32,
    TYPE_I64,
    TYPE_U32,
    TYPE_U64,
    TYPE_F64,
];

/// Declarations registered ahead of user types
pub fn builtin_declarations() -> Vec<TypeDeclaration> {
    let mut declarations = vec![
        TypeDeclaration::new(TYPE_PROVIDER).type_parameters(&["T"]),
        TypeDeclaration::new(TYPE_MAP).type_parameters(&["K", "V"]),
        TypeDeclaration::new(TYPE_ITERABLE).type_parameters(&["T"]),
        TypeDeclaration::new(TYPE_NAMED),
        TypeDeclaration::new(TYPE_LIST)
            .type_parameters(&["T"])
            .extends("Iterable<T>"),
        TypeDeclaration::new(TYPE_SET)
            .type_parameters(&["T"])
            .extends("Iterable<T>"),
    ];
    declarations.extend(SCALAR_TYPES.into_iter().map(TypeDeclaration::new));
    declarations
}
