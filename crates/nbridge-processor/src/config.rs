//! Direction configurations
//!
//! A [`Configuration`] describes one bridging direction: the marker that
//! requests generation, the proxy base type generated classes extend, the
//! constructor shapes a bridge class may declare and the parameters of an
//! exception handler. Built-in presets cover both directions; an
//! `nbridge.toml` file can override any part of them.

use crate::error::ConfigError;
use crate::well_known::WellKnownTypes;
use nbridge_types::{DeclId, DeclKind, PrimitiveType, TypeDecl, TypeId, TypeInfo};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Bridging direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host code calling into a native isolate
    HostToNative,
    /// Native code calling back into the host
    NativeToHost,
}

impl Direction {
    /// The opposite direction
    pub fn other(self) -> Direction {
        match self {
            Direction::HostToNative => Direction::NativeToHost,
            Direction::NativeToHost => Direction::HostToNative,
        }
    }

    /// Section name used in configuration files
    pub fn label(self) -> &'static str {
        match self {
            Direction::HostToNative => "host-to-native",
            Direction::NativeToHost => "native-to-host",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable description of one bridging direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    direction: Direction,
    handled_annotation: DeclId,
    proxy_base_type: TypeId,
    subclass_constructor_shapes: Vec<Vec<TypeId>>,
    handle_constructor_shapes: Vec<Vec<TypeId>>,
    exception_handler_types: Vec<TypeId>,
}

impl Configuration {
    /// Create a configuration, rejecting empty constructor shape lists
    pub fn new(
        direction: Direction,
        handled_annotation: DeclId,
        proxy_base_type: TypeId,
        subclass_constructor_shapes: Vec<Vec<TypeId>>,
        handle_constructor_shapes: Vec<Vec<TypeId>>,
        exception_handler_types: Vec<TypeId>,
    ) -> Result<Self, ConfigError> {
        if subclass_constructor_shapes.is_empty() {
            return Err(ConfigError::EmptyShapes {
                direction,
                kind: "subclass",
            });
        }
        if handle_constructor_shapes.is_empty() {
            return Err(ConfigError::EmptyShapes {
                direction,
                kind: "handle",
            });
        }
        Ok(Configuration {
            direction,
            handled_annotation,
            proxy_base_type,
            subclass_constructor_shapes,
            handle_constructor_shapes,
            exception_handler_types,
        })
    }

    /// Preset for host code calling into a native isolate
    pub fn host_to_native<T: TypeInfo + ?Sized>(types: &T, known: &WellKnownTypes) -> Self {
        let native_object = types.decl_type(known.native_object);
        Configuration {
            direction: Direction::HostToNative,
            handled_annotation: known.generate_host_to_native,
            proxy_base_type: native_object,
            subclass_constructor_shapes: vec![vec![
                types.decl_type(known.native_isolate),
                types.primitive(PrimitiveType::Long),
            ]],
            handle_constructor_shapes: vec![vec![native_object]],
            exception_handler_types: vec![types.decl_type(known.exception_handler_context)],
        }
    }

    /// Preset for native code calling back into the host
    pub fn native_to_host<T: TypeInfo + ?Sized>(types: &T, known: &WellKnownTypes) -> Self {
        let host_object = types.decl_type(known.host_object);
        Configuration {
            direction: Direction::NativeToHost,
            handled_annotation: known.generate_native_to_host,
            proxy_base_type: host_object,
            subclass_constructor_shapes: vec![vec![
                types.decl_type(known.jni_env),
                types.decl_type(known.j_object),
            ]],
            handle_constructor_shapes: vec![vec![host_object]],
            exception_handler_types: vec![types.decl_type(known.exception_handler_context)],
        }
    }

    /// The direction this configuration describes
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Marker annotation requesting generation in this direction
    pub fn handled_annotation(&self) -> DeclId {
        self.handled_annotation
    }

    /// Base type of generated proxies
    pub fn proxy_base_type(&self) -> TypeId {
        self.proxy_base_type
    }

    /// Constructor shapes for classes extending the proxy base type, most specific first
    pub fn subclass_constructor_shapes(&self) -> &[Vec<TypeId>] {
        &self.subclass_constructor_shapes
    }

    /// Constructor shapes for classes holding an endpoint handle field
    pub fn handle_constructor_shapes(&self) -> &[Vec<TypeId>] {
        &self.handle_constructor_shapes
    }

    /// Parameter types of an exception handler
    pub fn exception_handler_types(&self) -> &[TypeId] {
        &self.exception_handler_types
    }
}

/// Configurations for both directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionConfigs {
    /// Host to native
    pub host_to_native: Configuration,
    /// Native to host
    pub native_to_host: Configuration,
}

impl DirectionConfigs {
    /// Built-in presets for both directions
    pub fn presets<T: TypeInfo + ?Sized>(types: &T, known: &WellKnownTypes) -> Self {
        DirectionConfigs {
            host_to_native: Configuration::host_to_native(types, known),
            native_to_host: Configuration::native_to_host(types, known),
        }
    }

    /// Configuration of a direction
    pub fn get(&self, direction: Direction) -> &Configuration {
        match direction {
            Direction::HostToNative => &self.host_to_native,
            Direction::NativeToHost => &self.native_to_host,
        }
    }

    /// `(mine, other)` for a direction
    pub fn pair(&self, direction: Direction) -> (&Configuration, &Configuration) {
        (self.get(direction), self.get(direction.other()))
    }

    /// Direction requested by a declaration's markers, if any
    pub fn direction_of(&self, decl: &TypeDecl) -> Option<Direction> {
        [Direction::HostToNative, Direction::NativeToHost]
            .into_iter()
            .find(|&d| decl.annotation_of(self.get(d).handled_annotation).is_some())
    }
}

/// `nbridge.toml` contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigManifest {
    /// Overrides for the host to native direction
    #[serde(default)]
    pub host_to_native: Option<DirectionSection>,
    /// Overrides for the native to host direction
    #[serde(default)]
    pub native_to_host: Option<DirectionSection>,
}

/// One direction's overrides; absent keys keep the preset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DirectionSection {
    /// Qualified name of the marker annotation
    pub annotation: Option<String>,
    /// Qualified name of the proxy base type
    pub proxy_base: Option<String>,
    /// Constructor shapes for subclasses of the proxy base type
    pub subclass_constructors: Option<Vec<Vec<String>>>,
    /// Constructor shapes for classes with an endpoint handle
    pub handle_constructors: Option<Vec<Vec<String>>>,
    /// Exception handler parameter types
    pub exception_handler: Option<Vec<String>>,
}

impl ConfigManifest {
    /// Load a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config file contents
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the configured names against a universe
    pub fn resolve<T: TypeInfo + ?Sized>(
        &self,
        types: &T,
        known: &WellKnownTypes,
    ) -> Result<DirectionConfigs, ConfigError> {
        let presets = DirectionConfigs::presets(types, known);
        Ok(DirectionConfigs {
            host_to_native: apply(types, &presets.host_to_native, self.host_to_native.as_ref())?,
            native_to_host: apply(types, &presets.native_to_host, self.native_to_host.as_ref())?,
        })
    }
}

fn apply<T: TypeInfo + ?Sized>(
    types: &T,
    preset: &Configuration,
    section: Option<&DirectionSection>,
) -> Result<Configuration, ConfigError> {
    let Some(section) = section else {
        return Ok(preset.clone());
    };
    let direction = preset.direction;
    let resolve = |name: &str| resolve_type_name(types, direction, name);
    let resolve_all =
        |names: &[String]| names.iter().map(|n| resolve(n)).collect::<Result<Vec<_>, _>>();
    let resolve_shapes = |shapes: &[Vec<String>]| {
        shapes
            .iter()
            .map(|shape| resolve_all(shape))
            .collect::<Result<Vec<_>, _>>()
    };

    let handled_annotation = match &section.annotation {
        Some(name) => {
            let decl = types.lookup_decl(name).ok_or_else(|| ConfigError::UnknownType {
                direction,
                name: name.clone(),
            })?;
            if types.decl(decl).kind != DeclKind::Annotation {
                return Err(ConfigError::NotAnnotation { name: name.clone() });
            }
            decl
        }
        None => preset.handled_annotation,
    };
    let proxy_base_type = match &section.proxy_base {
        Some(name) => {
            let ty = resolve(name)?;
            if types.decl_of(ty).is_none() {
                return Err(ConfigError::InvalidProxyBase {
                    direction,
                    name: name.clone(),
                });
            }
            ty
        }
        None => preset.proxy_base_type,
    };
    let subclass = match &section.subclass_constructors {
        Some(shapes) => resolve_shapes(shapes)?,
        None => preset.subclass_constructor_shapes.clone(),
    };
    let handle = match &section.handle_constructors {
        Some(shapes) => resolve_shapes(shapes)?,
        None => preset.handle_constructor_shapes.clone(),
    };
    let exception_types = match &section.exception_handler {
        Some(names) => resolve_all(names)?,
        None => preset.exception_handler_types.clone(),
    };
    Configuration::new(
        direction,
        handled_annotation,
        proxy_base_type,
        subclass,
        handle,
        exception_types,
    )
}

/// Resolve a configured type name: a primitive or qualified name, with
/// optional `[]` suffixes
fn resolve_type_name<T: TypeInfo + ?Sized>(
    types: &T,
    direction: Direction,
    name: &str,
) -> Result<TypeId, ConfigError> {
    let trimmed = name.trim();
    if let Some(component) = trimmed.strip_suffix("[]") {
        let component = resolve_type_name(types, direction, component)?;
        return Ok(types.array_type(component));
    }
    if let Some(primitive) = PrimitiveType::from_name(trimmed) {
        return Ok(types.primitive(primitive));
    }
    types
        .lookup_decl(trimmed)
        .map(|decl| types.declared_type(decl, Vec::new()))
        .ok_or_else(|| ConfigError::UnknownType {
            direction,
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbridge_types::TypeContext;

    fn universe() -> (TypeContext, WellKnownTypes) {
        let mut ctx = TypeContext::new();
        let known = WellKnownTypes::install(&mut ctx).unwrap();
        (ctx, known)
    }

    #[test]
    fn test_presets() {
        let (ctx, known) = universe();
        let configs = DirectionConfigs::presets(&ctx, &known);
        let (mine, other) = configs.pair(Direction::HostToNative);
        assert_eq!(mine.handled_annotation(), known.generate_host_to_native);
        assert_eq!(other.direction(), Direction::NativeToHost);
        assert_eq!(ctx.type_name(mine.proxy_base_type()), "NativeObject");
        assert_eq!(mine.subclass_constructor_shapes()[0].len(), 2);
        assert_eq!(Direction::NativeToHost.other(), Direction::HostToNative);
    }

    #[test]
    fn test_empty_shapes_rejected() {
        let (ctx, known) = universe();
        let err = Configuration::new(
            Direction::HostToNative,
            known.generate_host_to_native,
            ctx.decl_type(known.native_object),
            Vec::new(),
            vec![vec![ctx.decl_type(known.native_object)]],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyShapes { kind: "subclass", .. }));
    }

    #[test]
    fn test_manifest_overrides_section() {
        let (ctx, known) = universe();
        let manifest = ConfigManifest::from_str(
            r#"
            [host-to-native]
            subclass-constructors = [["nbridge.NativeIsolate", "long"], ["long[]"]]
            exception-handler = []
            "#,
        )
        .unwrap();
        let configs = manifest.resolve(&ctx, &known).unwrap();
        let h2n = &configs.host_to_native;
        assert_eq!(h2n.subclass_constructor_shapes().len(), 2);
        assert_eq!(ctx.type_name(h2n.subclass_constructor_shapes()[1][0]), "long[]");
        assert!(h2n.exception_handler_types().is_empty());
        assert_eq!(h2n.handle_constructor_shapes().len(), 1);
        assert_eq!(configs.native_to_host, Configuration::native_to_host(&ctx, &known));
    }

    #[test]
    fn test_manifest_unknown_type() {
        let (ctx, known) = universe();
        let manifest = ConfigManifest::from_str(
            r#"
            [native-to-host]
            proxy-base = "demo.Missing"
            "#,
        )
        .unwrap();
        let err = manifest.resolve(&ctx, &known).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownType { direction: Direction::NativeToHost, .. }
        ));
    }

    #[test]
    fn test_manifest_rejects_unknown_keys() {
        assert!(matches!(
            ConfigManifest::from_str("[host-to-native]\nbogus = 1\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_annotation_must_be_annotation_type() {
        let (ctx, known) = universe();
        let manifest = ConfigManifest::from_str(
            "[host-to-native]\nannotation = \"nbridge.NativeObject\"\n",
        )
        .unwrap();
        assert!(matches!(
            manifest.resolve(&ctx, &known),
            Err(ConfigError::NotAnnotation { .. })
        ));
    }
}
