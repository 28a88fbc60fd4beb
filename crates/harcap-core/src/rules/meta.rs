//! Rules for artifact metadata documents.
//!
//! Empty for now; the list exists so header-presence checks can be added
//! without touching the engine or its call sites.

use super::Rule;

pub static META_RULES: &[Rule] = &[
    // Example of a future header check:
    // Rule {
    //     code: "missing.x-requested-with",
    //     test: |meta| {
    //         meta.get("request")
    //             .and_then(|r| r.get("headers"))
    //             .and_then(|h| h.as_array())
    //             .map_or(false, |headers| {
    //                 headers.iter().any(|h| {
    //                     h.get("name").and_then(|n| n.as_str()).map_or(false, |n| {
    //                         n.eq_ignore_ascii_case("x-requested-with")
    //                     })
    //                 })
    //             })
    //     },
    // },
];
