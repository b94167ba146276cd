//! Registry of type metadata consulted by every walk
//!
//! The registry is built once from [`TypeDeclaration`]s, validated as a whole,
//! and is immutable afterwards. It is `Send + Sync` so walks on several
//! threads can share one instance behind an `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use super::builtin::builtin_declarations;
use super::{PropertyMetadata, TypeDeclaration, TypeMetadata};
use crate::error::{Error, Result};
use crate::type_name::TypeName;
use crate::type_token::TypeToken;

/// Lookup of declared metadata by raw type
///
/// Implementations must be idempotent: the same type always yields the same
/// metadata for the lifetime of a walk.
pub trait TypeMetadataStore: Send + Sync {
    /// Metadata for a raw type
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotRegistered`] when the type is unknown.
    fn type_metadata(&self, type_name: &TypeName) -> Result<Arc<TypeMetadata>>;

    /// Parameterization of `root` as seen from `token`
    ///
    /// Walks `token`'s declared supertypes, substituting type arguments on the
    /// way, until it reaches `root`. For `StringList extends List<String>` and
    /// root `Iterable` the result is `Iterable<String>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGenericShape`] when `token` is an unbound
    /// variable, a raw use of a generic type, has the wrong number of
    /// arguments, or does not reach `root`; any lookup failure is propagated.
    fn generic_supertype(&self, token: &TypeToken, root: &TypeName) -> Result<TypeToken> {
        let raw = token.require_raw()?;
        let metadata = self.type_metadata(raw)?;
        let bindings = metadata.bind_arguments(token.arguments())?;
        if raw == root {
            return Ok(token.clone());
        }

        for supertype in metadata.supertypes() {
            let resolved = supertype.substitute(&bindings);
            let super_raw = resolved.require_raw()?;
            if super_raw == root || self.type_metadata(super_raw)?.is_subtype_of(root) {
                return self.generic_supertype(&resolved, root);
            }
        }

        Err(Error::malformed(token, format!("does not extend {root}")).into())
    }
}

/// Immutable map from type name to its metadata
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeName, Arc<TypeMetadata>>,
}

impl TypeRegistry {
    /// Start a registry that already knows the built-in types
    #[must_use]
    pub fn builder() -> TypeRegistryBuilder { TypeRegistryBuilder::new() }

    /// Number of registered types, built-ins included
    #[must_use]
    pub fn len(&self) -> usize { self.types.len() }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    /// Whether a type is registered
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool { self.types.contains_key(type_name) }

    /// Registered type names in sorted order
    #[must_use]
    pub fn type_names(&self) -> Vec<&TypeName> { self.types.keys().sorted().collect() }
}

impl TypeMetadataStore for TypeRegistry {
    fn type_metadata(&self, type_name: &TypeName) -> Result<Arc<TypeMetadata>> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::not_registered(type_name).into())
    }
}

/// Declaration parsed into tokens, before ancestors are known
struct ParsedDeclaration {
    type_parameters: Vec<String>,
    supertypes:      Vec<TypeToken>,
    properties:      Vec<PropertyMetadata>,
}

/// Collects declarations and validates them into a [`TypeRegistry`]
pub struct TypeRegistryBuilder {
    declarations: Vec<TypeDeclaration>,
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self { Self::new() }
}

impl TypeRegistryBuilder {
    /// A builder pre-loaded with the built-in types
    #[must_use]
    pub fn new() -> Self {
        Self {
            declarations: builtin_declarations(),
        }
    }

    /// Add a type declaration
    #[must_use]
    pub fn register(mut self, declaration: TypeDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Validate every declaration and freeze the registry
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMetadata`] for a type registered twice, a
    /// property name declared twice on one type, a supertype that is not
    /// registered, is a type variable, has the wrong number of arguments, or
    /// closes a cycle, and for inherited properties that clash (the same name
    /// from two supertypes, or an override of a different kind). Returns [`Error::InvalidTypeExpression`] for a type
    /// expression that does not parse.
    pub fn build(self) -> Result<TypeRegistry> {
        let mut parsed: HashMap<TypeName, ParsedDeclaration> = HashMap::new();
        for declaration in &self.declarations {
            if parsed.contains_key(&declaration.type_name) {
                return Err(Error::invalid_metadata(
                    "type declaration",
                    format!("{} is registered twice", declaration.type_name),
                )
                .into());
            }
            parsed.insert(declaration.type_name.clone(), Self::parse_declaration(declaration)?);
        }

        Self::check_supertypes(&parsed)?;

        let mut ancestors = HashMap::with_capacity(parsed.len());
        for name in parsed.keys() {
            collect_ancestors(name, &parsed, &mut ancestors, &mut Vec::new())?;
        }

        let mut properties = HashMap::with_capacity(parsed.len());
        for name in parsed.keys() {
            collect_properties(name, &parsed, &mut properties)?;
        }

        let types: HashMap<TypeName, Arc<TypeMetadata>> = parsed
            .into_iter()
            .map(|(name, declaration)| {
                let metadata = TypeMetadata::new(
                    name.clone(),
                    declaration.type_parameters,
                    declaration.supertypes,
                    ancestors.remove(&name).unwrap_or_default(),
                    properties
                        .remove(&name)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|declared| declared.property)
                        .collect(),
                );
                (name, Arc::new(metadata))
            })
            .collect();

        debug!(types = types.len(), "Built type registry");
        Ok(TypeRegistry { types })
    }

    fn parse_declaration(declaration: &TypeDeclaration) -> Result<ParsedDeclaration> {
        let parameters = &declaration.type_parameters;

        let supertypes = declaration
            .supertypes
            .iter()
            .map(|expression| Ok(TypeToken::parse(expression)?.bind_parameters(parameters)))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let mut properties = Vec::with_capacity(declaration.properties.len());
        for property in &declaration.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(Error::invalid_metadata(
                    "property declaration",
                    format!(
                        "{} declares property '{}' twice",
                        declaration.type_name, property.name
                    ),
                )
                .into());
            }
            let declared_type = TypeToken::parse(&property.type_expression)?.bind_parameters(parameters);
            properties.push(PropertyMetadata::new(
                property.name.clone(),
                property.kind,
                declared_type,
                property.getter.clone(),
            ));
        }

        Ok(ParsedDeclaration {
            type_parameters: parameters.clone(),
            supertypes,
            properties,
        })
    }

    /// Every supertype must be a registered class used with its declared arity
    fn check_supertypes(parsed: &HashMap<TypeName, ParsedDeclaration>) -> Result<()> {
        for (name, declaration) in parsed {
            for supertype in &declaration.supertypes {
                let Some(raw) = supertype.raw() else {
                    return Err(Error::invalid_metadata(
                        "supertype",
                        format!("{name} cannot extend type variable {supertype}"),
                    )
                    .into());
                };
                let Some(target) = parsed.get(raw) else {
                    return Err(Error::invalid_metadata(
                        "supertype",
                        format!("{name} extends {supertype} but {raw} is not registered"),
                    )
                    .into());
                };
                if supertype.arguments().len() != target.type_parameters.len() {
                    return Err(Error::invalid_metadata(
                        "supertype",
                        format!(
                            "{name} extends {supertype} but {raw} takes {} type argument(s)",
                            target.type_parameters.len()
                        ),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Transitive supertypes of `name`, nearest first, without duplicates
fn collect_ancestors(
    name: &TypeName,
    parsed: &HashMap<TypeName, ParsedDeclaration>,
    resolved: &mut HashMap<TypeName, Vec<TypeName>>,
    in_progress: &mut Vec<TypeName>,
) -> Result<Vec<TypeName>> {
    if let Some(done) = resolved.get(name) {
        return Ok(done.clone());
    }
    if in_progress.contains(name) {
        return Err(Error::invalid_metadata(
            "supertype",
            format!("cycle through {}", in_progress.iter().join(" -> ")),
        )
        .into());
    }

    in_progress.push(name.clone());
    let mut ancestors = Vec::new();
    let supertypes = parsed.get(name).map(|d| d.supertypes.as_slice()).unwrap_or_default();
    for raw in supertypes.iter().filter_map(TypeToken::raw) {
        ancestors.push(raw.clone());
        ancestors.extend(collect_ancestors(raw, parsed, resolved, in_progress)?);
    }
    in_progress.pop();

    let ancestors: Vec<TypeName> = ancestors.into_iter().unique().collect();
    resolved.insert(name.clone(), ancestors.clone());
    Ok(ancestors)
}

/// A property together with the type that declared it
#[derive(Clone)]
struct DeclaredProperty {
    declared_by: TypeName,
    property:    PropertyMetadata,
}

/// Inherited properties in supertype order, then the type's own
///
/// An own property named like an inherited one overrides it in place. The
/// same inherited property reached along two paths is kept once.
fn collect_properties(
    name: &TypeName,
    parsed: &HashMap<TypeName, ParsedDeclaration>,
    resolved: &mut HashMap<TypeName, Vec<DeclaredProperty>>,
) -> Result<Vec<DeclaredProperty>> {
    if let Some(done) = resolved.get(name) {
        return Ok(done.clone());
    }
    let Some(declaration) = parsed.get(name) else {
        return Ok(Vec::new());
    };

    let mut merged: Vec<DeclaredProperty> = Vec::new();
    for supertype in &declaration.supertypes {
        let Some(raw) = supertype.raw() else { continue };
        let Some(target) = parsed.get(raw) else { continue };
        let bindings: HashMap<String, TypeToken> = target
            .type_parameters
            .iter()
            .cloned()
            .zip(supertype.arguments().iter().cloned())
            .collect();

        for inherited in collect_properties(raw, parsed, resolved)? {
            let position = merged
                .iter()
                .position(|existing| existing.property.name() == inherited.property.name());
            match position {
                Some(index) if merged[index].declared_by == inherited.declared_by => {}
                Some(index) => {
                    return Err(Error::invalid_metadata(
                        "property declaration",
                        format!(
                            "{name} inherits property '{}' from both {} and {}",
                            inherited.property.name(),
                            merged[index].declared_by,
                            inherited.declared_by
                        ),
                    )
                    .into());
                }
                None => {
                    let declared_type = inherited.property.declared_type().substitute(&bindings);
                    merged.push(DeclaredProperty {
                        declared_by: inherited.declared_by,
                        property:    inherited.property.with_declared_type(declared_type),
                    });
                }
            }
        }
    }

    for property in &declaration.properties {
        let own = DeclaredProperty {
            declared_by: name.clone(),
            property:    property.clone(),
        };
        match merged
            .iter()
            .position(|existing| existing.property.name() == property.name())
        {
            Some(index) if merged[index].property.kind() == property.kind() => merged[index] = own,
            Some(index) => {
                return Err(Error::invalid_metadata(
                    "property declaration",
                    format!(
                        "{name} overrides {} property '{}' inherited from {} as {}",
                        merged[index].property.kind(),
                        property.name(),
                        merged[index].declared_by,
                        property.kind()
                    ),
                )
                .into());
            }
            None => merged.push(own),
        }
    }

    resolved.insert(name.clone(), merged.clone());
    Ok(merged)
}
