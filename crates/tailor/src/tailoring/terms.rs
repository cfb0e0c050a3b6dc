//! Curated technology-term vocabularies and the equivalence relation used by
//! the matcher and selector.
//!
//! `tech_terms_match` is a curated equivalence relation, NOT substring
//! matching: "Tailwind CSS" and "TailwindCSS" are the same technology, but
//! "Java" must never match "JavaScript" and bare abbreviations like "JS" must
//! never match their expansions.

/// Known multi-word technology names. Checked before single-word tokens so
/// "Spring Boot" is not mistaken for "Spring" + "Boot".
pub const MULTI_WORD_TECH: &[&str] = &[
    "tailwind css",
    "spring boot",
    "ruby on rails",
    "react native",
    "github actions",
    "google cloud",
    "sql server",
    "visual basic",
    "apache kafka",
    "apache spark",
    "apache airflow",
    "amazon web services",
    "machine learning",
    "distributed systems",
];

/// Known single-word technology names.
pub const SINGLE_WORD_TECH: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "rust",
    "go",
    "golang",
    "kotlin",
    "swift",
    "ruby",
    "php",
    "scala",
    "elixir",
    "c",
    "c++",
    "c#",
    "react",
    "angular",
    "vue",
    "svelte",
    "django",
    "flask",
    "fastapi",
    "rails",
    "laravel",
    "spring",
    "express",
    "node",
    "node.js",
    "nodejs",
    "next.js",
    "nextjs",
    "tailwind",
    "tailwindcss",
    "kubernetes",
    "k8s",
    "docker",
    "terraform",
    "ansible",
    "jenkins",
    "aws",
    "azure",
    "gcp",
    "postgresql",
    "postgres",
    "mysql",
    "sqlite",
    "mongodb",
    "redis",
    "kafka",
    "rabbitmq",
    "elasticsearch",
    "graphql",
    "grpc",
    "rest",
    "linux",
    "git",
    "sql",
    "html",
    "css",
    "sass",
    "flutter",
    "numpy",
    "pandas",
    "pytorch",
    "tensorflow",
    "spark",
    "hadoop",
    "airflow",
    "snowflake",
    "dbt",
];

/// Action verbs marking a JD line as a responsibility.
pub const ACTION_VERBS: &[&str] = &[
    "build", "design", "own", "lead", "deliver", "maintain", "improve", "develop", "implement",
    "drive", "ship", "architect", "mentor",
];

/// Phrases marking preferred (nice-to-have) requirement lines.
pub const PREFERRED_MARKERS: &[&str] = &[
    "nice to have",
    "nice-to-have",
    "bonus",
    "preferred",
    "a plus",
    "would be great",
];

/// Phrases marking required lines; they reset the sticky preferred state.
pub const REQUIRED_MARKERS: &[&str] = &[
    "required",
    "must have",
    "must-have",
    "requirement",
    "you need",
    "we need",
];

/// Seniority-level words scanned anywhere in the JD (capped at 5 distinct).
pub const SENIORITY_WORDS: &[&str] = &[
    "intern",
    "junior",
    "mid-level",
    "senior",
    "staff",
    "principal",
    "lead",
    "architect",
    "director",
];

/// Alias groups — names in the same group refer to the same technology.
/// Additions must be genuine spelling/formatting variants, never ecosystem
/// neighbours (React is not JavaScript here).
const ALIAS_GROUPS: &[&[&str]] = &[
    &["tailwind", "tailwind css", "tailwindcss"],
    &["postgresql", "postgres"],
    &["node", "node.js", "nodejs"],
    &["next.js", "nextjs"],
    &["react", "react.js", "reactjs"],
    &["vue", "vue.js", "vuejs"],
    &["express", "express.js", "expressjs"],
    &["mongodb", "mongo"],
    &[".net", "dotnet"],
    &["kubernetes", "k8s"],
    &["amazon web services", "aws"],
    &["ruby on rails", "rails"],
];

/// Same-prefix or abbreviation pairs that must NEVER match, even if an alias
/// group is ever mis-extended. Checked first, in both orders.
const NEVER_MATCH: &[(&str, &str)] = &[
    ("java", "javascript"),
    ("go", "golang"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("c", "c++"),
    ("c", "c#"),
    ("c++", "c#"),
];

/// Ecosystem relations: (member, platform). Used for the ecosystem match tier
/// and the selector's ecosystem overlap signal.
const ECOSYSTEM_PAIRS: &[(&str, &str)] = &[
    ("django", "python"),
    ("flask", "python"),
    ("fastapi", "python"),
    ("pandas", "python"),
    ("numpy", "python"),
    ("pytorch", "python"),
    ("tensorflow", "python"),
    ("react", "javascript"),
    ("vue", "javascript"),
    ("angular", "typescript"),
    ("express", "node"),
    ("next.js", "react"),
    ("rails", "ruby"),
    ("laravel", "php"),
    ("spring", "java"),
    ("spring boot", "java"),
    ("tailwind", "css"),
    ("k8s", "docker"),
    ("kubernetes", "docker"),
];

/// Lowercase + trim. All curated tables hold normalized forms.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Curated equivalence: equal after normalization, or members of the same
/// alias group. Hard negatives (Java/JavaScript, Go/Golang, JS/TS against
/// their expansions) always return false.
pub fn tech_terms_match(a: &str, b: &str) -> bool {
    let a = normalize_term(a);
    let b = normalize_term(b);

    if NEVER_MATCH
        .iter()
        .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
    {
        return false;
    }

    if a == b {
        return true;
    }

    ALIAS_GROUPS
        .iter()
        .any(|group| group.contains(&a.as_str()) && group.contains(&b.as_str()))
}

/// True when the two technologies sit in the same ecosystem (framework and its
/// language, tool and its platform). Alias-tolerant on both sides.
pub fn ecosystem_related(a: &str, b: &str) -> bool {
    let a = normalize_term(a);
    let b = normalize_term(b);
    ECOSYSTEM_PAIRS.iter().any(|(member, platform)| {
        (tech_terms_match(&a, member) && tech_terms_match(&b, platform))
            || (tech_terms_match(&b, member) && tech_terms_match(&a, platform))
    })
}

/// Splits text into lowercase word tokens, keeping the characters that appear
/// inside technology names (`+`, `#`, `.`, `/`, `-`).
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || "+#./-".contains(c)))
        .map(|t| t.trim_matches(|c: char| "./-".contains(c)))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removes HTML tags. The adapter measures rewritten text against its
/// character budget after stripping markup.
pub fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
