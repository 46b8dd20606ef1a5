//! Round processing over a whole universe

use crate::config::{Direction, DirectionConfigs};
use crate::definition::DefinitionData;
use crate::error::BridgeError;
use crate::parser::BridgeParser;
use crate::well_known::WellKnownTypes;
use nbridge_types::{DeclId, ElementRef, TypeInfo};
use tracing::{debug, info};

/// Outcome of one declaration in one direction
#[derive(Debug)]
pub struct ProcessedDecl {
    /// The marked declaration
    pub decl: DeclId,
    /// Direction of the marker that selected it
    pub direction: Direction,
    /// The definition, or every error reported for the declaration
    pub result: Result<DefinitionData, Vec<BridgeError>>,
}

impl ProcessedDecl {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn errors(&self) -> &[BridgeError] {
        match &self.result {
            Ok(_) => &[],
            Err(errors) => errors,
        }
    }
}

/// Parses every marked declaration of a universe
pub struct BridgeProcessor<'a, T: TypeInfo + ?Sized> {
    types: &'a T,
    known: &'a WellKnownTypes,
    configs: &'a DirectionConfigs,
}

impl<'a, T: TypeInfo + ?Sized> BridgeProcessor<'a, T> {
    /// A processor over one universe with both direction configurations
    pub fn new(types: &'a T, known: &'a WellKnownTypes, configs: &'a DirectionConfigs) -> Self {
        BridgeProcessor { types, known, configs }
    }

    /// Declarations carrying a direction marker, with that direction
    ///
    /// A declaration marked for both directions appears twice.
    pub fn marked_decls(&self) -> Vec<(DeclId, Direction)> {
        let mut marked = Vec::new();
        for decl in self.types.decls() {
            let type_decl = self.types.decl(decl);
            for direction in [Direction::HostToNative, Direction::NativeToHost] {
                let marker = self.configs.get(direction).handled_annotation();
                if type_decl.annotation_of(marker).is_some() {
                    marked.push((decl, direction));
                }
            }
        }
        marked
    }

    /// Parse one declaration for one direction
    pub fn process_decl(&self, decl: DeclId, direction: Direction) -> ProcessedDecl {
        let (mine, other) = self.configs.pair(direction);
        let result =
            BridgeParser::new(self.types, self.known, mine, other).parse(ElementRef::Type(decl));
        debug!(
            decl = %self.types.qualified_name(decl),
            %direction,
            ok = result.is_ok(),
            "declaration processed"
        );
        ProcessedDecl {
            decl,
            direction,
            result,
        }
    }

    /// Parse every marked declaration, optionally only those whose
    /// qualified or simple name equals `filter`
    pub fn process(&self, filter: Option<&str>) -> Vec<ProcessedDecl> {
        let results: Vec<ProcessedDecl> = self
            .marked_decls()
            .into_iter()
            .filter(|&(decl, _)| {
                filter.map_or(true, |name| {
                    self.types.qualified_name(decl) == name || self.types.simple_name(decl) == name
                })
            })
            .map(|(decl, direction)| self.process_decl(decl, direction))
            .collect();
        info!(
            declarations = results.len(),
            failed = results.iter().filter(|r| !r.is_ok()).count(),
            "round processed"
        );
        results
    }
}
