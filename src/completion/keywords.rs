//! Static keyword tables offered alongside bare-term completions.

const TURTLE: &[&str] = &["a", "true", "false", "@prefix", "@base", "PREFIX", "BASE"];

const TRIG: &[&str] = &[
    "a", "true", "false", "@prefix", "@base", "PREFIX", "BASE", "GRAPH",
];

const N3: &[&str] = &[
    "a", "true", "false", "@prefix", "@base", "@keywords", "@forAll", "@forSome", "is", "of",
    "has",
];

const SPARQL: &[&str] = &[
    "BASE", "PREFIX", "SELECT", "CONSTRUCT", "DESCRIBE", "ASK", "WHERE", "FROM", "NAMED",
    "OPTIONAL", "FILTER", "UNION", "MINUS", "GRAPH", "SERVICE", "BIND", "VALUES", "ORDER", "BY",
    "GROUP", "HAVING", "LIMIT", "OFFSET", "DISTINCT", "REDUCED", "a",
];

const JSON_LD: &[&str] = &[
    "@context", "@id", "@type", "@value", "@language", "@graph", "@list", "@set", "@reverse",
    "@index", "@base", "@vocab", "@container", "@nest", "@none", "@prefix", "@direction",
    "@version", "@json", "@protected", "@propagate", "@import", "@included",
];

const RDF_XML: &[&str] = &[
    "rdf:RDF",
    "rdf:Description",
    "rdf:about",
    "rdf:resource",
    "rdf:datatype",
    "rdf:parseType",
    "rdf:nodeID",
    "rdf:ID",
    "rdf:li",
    "xml:lang",
    "xml:base",
    "xmlns",
];

const RDFA: &[&str] = &[
    "vocab", "prefix", "property", "typeof", "resource", "about", "rel", "rev", "href", "src",
    "content", "datatype", "inlist",
];

/// Keywords for an editor language identifier; unknown languages have none.
pub fn keywords_for(language: Option<&str>) -> &'static [&'static str] {
    match language {
        Some("turtle" | "ttl") => TURTLE,
        Some("trig") => TRIG,
        Some("n3" | "notation3") => N3,
        Some("sparql") => SPARQL,
        Some("json-ld" | "jsonld") => JSON_LD,
        Some("xml" | "rdf" | "rdfxml" | "rdf-xml") => RDF_XML,
        Some("html") => RDFA,
        _ => &[],
    }
}
