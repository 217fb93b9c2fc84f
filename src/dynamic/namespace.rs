//! Namespace catalog of struct types built at runtime
//!
//! Fully-qualified names are split into path segments on `::` or `.`.
//! Intermediate segments become containers on demand; the leaf holds the
//! type. A segment may be both a type and a container of further types.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::structs::StructType;

static GLOBAL: OnceLock<TypeCatalog> = OnceLock::new();

#[derive(Debug, Default)]
struct Node {
    struct_type: Option<StructType>,
    children: BTreeMap<String, Node>,
}

impl Node {
    fn find(&self, path: &[String]) -> Option<&Node> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get(head)?.find(rest),
        }
    }

    fn collect(&self, prefix: &str, out: &mut Vec<String>) {
        for (segment, child) in &self.children {
            let path = if prefix.is_empty() {
                segment.clone()
            } else {
                format!("{}::{}", prefix, segment)
            };
            if child.struct_type.is_some() {
                out.push(path.clone());
            }
            child.collect(&path, out);
        }
    }
}

/// Lock-guarded tree of namespaces and struct types.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    root: Mutex<Node>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide catalog.
    pub fn global() -> &'static TypeCatalog {
        GLOBAL.get_or_init(TypeCatalog::new)
    }

    fn lock(&self) -> MutexGuard<'_, Node> {
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `"Examples::Users.Admin"` -> `["Examples", "Users", "Admin"]`.
    pub fn split_path(name: &str) -> Vec<String> {
        name.split("::")
            .flat_map(|part| part.split('.'))
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<StructType> {
        let path = Self::split_path(name);
        if path.is_empty() {
            return None;
        }
        self.lock().find(&path).and_then(|node| node.struct_type.clone())
    }

    /// Whether `name` exists as a container of other entries.
    pub fn is_namespace(&self, name: &str) -> bool {
        let path = Self::split_path(name);
        self.lock()
            .find(&path)
            .map_or(false, |node| !node.children.is_empty())
    }

    /// Stores `struct_type` at `name`, creating intermediate containers.
    /// Returns the type it replaced.
    pub fn insert(&self, name: &str, struct_type: StructType) -> Option<StructType> {
        let path = Self::split_path(name);
        if path.is_empty() {
            return None;
        }
        let mut root = self.lock();
        let mut node = &mut *root;
        for segment in path {
            node = node.children.entry(segment).or_default();
        }
        node.struct_type.replace(struct_type)
    }

    pub fn remove(&self, name: &str) -> Option<StructType> {
        let path = Self::split_path(name);
        let mut root = self.lock();
        let mut node = &mut *root;
        for segment in &path {
            node = node.children.get_mut(segment)?;
        }
        node.struct_type.take()
    }

    /// Fully-qualified names of every stored type, `::`-joined and sorted.
    pub fn names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.lock().collect("", &mut out);
        out
    }
}
