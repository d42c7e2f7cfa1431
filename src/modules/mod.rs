//! Module namespaces available after an `import` statement (spec §4.3).

pub mod re;
