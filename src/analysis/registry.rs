//! Index of the functions and methods declared in a package

use crate::sema::{PackageInfo, Type};
use crate::syntax::ast::{Decl, File, FuncDecl};
use std::collections::HashMap;

/// Function and method index for one package.
///
/// Functions live in a flat name index (the language forbids shadowing at
/// package scope); methods share names across receiver types, so they are
/// indexed as lists. Iteration follows declaration order so every
/// downstream walk is deterministic.
pub struct FuncRegistry<'a> {
    functions: HashMap<String, &'a FuncDecl>,
    methods: HashMap<String, Vec<&'a FuncDecl>>,
    order: Vec<&'a FuncDecl>,
}

impl<'a> FuncRegistry<'a> {
    /// Index all top-level function declarations, without descending into
    /// bodies.
    pub fn collect(files: &'a [File]) -> Self {
        let mut registry = FuncRegistry {
            functions: HashMap::new(),
            methods: HashMap::new(),
            order: Vec::new(),
        };

        for file in files {
            for decl in &file.decls {
                let Decl::Func(func) = decl else { continue };
                registry.order.push(func);
                if func.is_method() {
                    registry
                        .methods
                        .entry(func.name.clone())
                        .or_default()
                        .push(func);
                } else {
                    registry.functions.insert(func.name.clone(), func);
                }
            }
        }
        registry
    }

    /// All declarations in source order
    pub fn iter(&self) -> impl Iterator<Item = &'a FuncDecl> + '_ {
        self.order.iter().copied()
    }

    /// Look up a non-method function by name
    pub fn function(&self, name: &str) -> Option<&'a FuncDecl> {
        self.functions.get(name).copied()
    }

    /// Methods sharing the given name, across receiver types
    pub fn methods_named(&self, name: &str) -> &[&'a FuncDecl] {
        self.methods.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve the method `name` on receiver type `recv`: the receiver's
    /// own method set first, then the pointer method set when `recv` is
    /// not already a pointer.
    pub fn search_method(
        &self,
        info: &PackageInfo<'a>,
        recv: &Type,
        name: &str,
    ) -> Option<&'a FuncDecl> {
        info.method(recv, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::PackageInfo;
    use crate::syntax::parse_source;
    use std::path::Path;

    const SOURCE: &str = r#"package demo

type Error struct {
	TheCode string
}

func (e *Error) Code() string { return e.TheCode }
func (e *Error) Error() string { return e.TheCode }

type Other struct{}

func (Other) Code() string { return "other-code" }

func Standalone() error {
	return nil
}
"#;

    #[test]
    fn test_collect_indexes_functions_and_methods() {
        let file = parse_source(SOURCE, Path::new("demo.vo")).unwrap();
        let files = [file];
        let registry = FuncRegistry::collect(&files);

        assert!(registry.function("Standalone").is_some());
        assert!(registry.function("Code").is_none());
        assert_eq!(registry.methods_named("Code").len(), 2);
        assert_eq!(registry.iter().count(), 4);
    }

    #[test]
    fn test_search_method_by_receiver_type() {
        let file = parse_source(SOURCE, Path::new("demo.vo")).unwrap();
        let files = [file];
        let registry = FuncRegistry::collect(&files);
        let info = PackageInfo::resolve(&files);

        let error_id = info.lookup_type("Error").unwrap();
        let other_id = info.lookup_type("Other").unwrap();

        // Pointer-receiver method found through the value type.
        let on_error = registry
            .search_method(&info, &Type::Named(error_id), "Code")
            .unwrap();
        assert_eq!(on_error.recv.as_ref().unwrap().type_name, "Error");

        let on_other = registry
            .search_method(&info, &Type::Named(other_id), "Code")
            .unwrap();
        assert_eq!(on_other.recv.as_ref().unwrap().type_name, "Other");

        assert!(registry
            .search_method(&info, &Type::Named(error_id), "Missing")
            .is_none());
    }
}
