//! go-import-subtree creates a Go file with side-effect imports for every
//! sub-folder of the given folders, for use with `go generate`.
//!
//! Packages that register themselves when imported (plugins, drivers,
//! extension points) can live in a `plugins/` folder and be linked in by
//! regenerating this file instead of maintaining the import list by hand.

pub mod app;
