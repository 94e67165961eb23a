use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::FromIterator;

use crate::datatypes::DataType;
use crate::error::OptimizerError;

/// Uniquely identifies an output column of a plan node within a query.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Symbol(usize);

impl Symbol {
    /// Creates a symbol with the given identifier.
    pub fn new(id: usize) -> Self {
        Symbol(id)
    }

    /// Returns the identifier of this symbol.
    pub fn id(&self) -> usize {
        self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "col:{}", self.0)
    }
}

/// Symbol metadata.
#[derive(Debug, Clone)]
pub struct SymbolMetadata {
    symbol: Symbol,
    name: String,
    data_type: DataType,
}

impl SymbolMetadata {
    /// Returns the symbol this metadata describes.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Returns the name of the column.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type of the column.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }
}

/// Stores a mapping between symbols and their names and types.
#[derive(Debug, Clone)]
pub struct Metadata {
    symbols: Vec<SymbolMetadata>,
}

impl Metadata {
    /// Retrieves metadata of the given symbol.
    pub fn get_symbol(&self, symbol: &Symbol) -> Option<&SymbolMetadata> {
        symbol.0.checked_sub(1).and_then(|i| self.symbols.get(i))
    }

    /// Builds a [TypeProvider] that contains the types of all symbols.
    pub fn type_provider(&self) -> TypeProvider {
        self.symbols.iter().map(|s| (s.symbol, s.data_type)).collect()
    }
}

/// A mutable variant of a [Metadata](self::Metadata) used to allocate new symbols.
#[derive(Debug, Default)]
pub struct MutableMetadata {
    inner: RefCell<MutableMetadataInner>,
}

#[derive(Debug, Default)]
struct MutableMetadataInner {
    symbols: Vec<SymbolMetadata>,
    names: HashMap<String, Symbol>,
}

impl MutableMetadata {
    /// Creates a new instance of a MutableMetadata.
    pub fn new() -> Self {
        MutableMetadata::default()
    }

    /// Allocates a new symbol with the given name and type.
    /// Returns an error if a symbol with the same name already exists.
    pub fn add_symbol(&self, name: &str, data_type: DataType) -> Result<Symbol, OptimizerError> {
        let mut inner = self.inner.borrow_mut();
        let symbol = Symbol(inner.symbols.len() + 1);

        match inner.names.entry(name.to_string()) {
            Entry::Occupied(o) => {
                return Err(OptimizerError::argument(format!("Symbol {} already exists: {}", name, o.get())));
            }
            Entry::Vacant(v) => {
                v.insert(symbol);
            }
        }

        inner.symbols.push(SymbolMetadata {
            symbol,
            name: name.to_string(),
            data_type,
        });
        Ok(symbol)
    }

    /// Returns a symbol with the given name.
    pub fn get_symbol_by_name(&self, name: &str) -> Option<Symbol> {
        self.inner.borrow().names.get(name).copied()
    }

    /// Creates an instances of a immutable [metadata](self::Metadata) from this metadata.
    pub fn build_metadata(&self) -> Metadata {
        let inner = self.inner.borrow();
        Metadata {
            symbols: inner.symbols.clone(),
        }
    }
}

/// Provides the logical types of symbols.
#[derive(Debug, Clone, Default)]
pub struct TypeProvider {
    types: HashMap<Symbol, DataType>,
}

impl TypeProvider {
    /// Creates an empty type provider.
    pub fn new() -> Self {
        TypeProvider::default()
    }

    /// Returns the type of the given symbol.
    /// Returns an error if the type of the symbol is not known.
    pub fn get(&self, symbol: &Symbol) -> Result<&DataType, OptimizerError> {
        self.types
            .get(symbol)
            .ok_or_else(|| OptimizerError::argument(format!("No type for symbol {}", symbol)))
    }

    /// Sets the type of the given symbol.
    pub fn insert(&mut self, symbol: Symbol, data_type: DataType) {
        self.types.insert(symbol, data_type);
    }

    /// Returns the number of symbols with known types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if this provider knows no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<(Symbol, DataType)> for TypeProvider {
    fn from_iter<T: IntoIterator<Item = (Symbol, DataType)>>(iter: T) -> Self {
        TypeProvider {
            types: iter.into_iter().collect(),
        }
    }
}
