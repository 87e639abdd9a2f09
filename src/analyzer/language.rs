//! Language Detection
//!
//! One metadata table drives extension lookup, display names, code-fence
//! identifiers and the syntax family the symbol probes key off.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::file_extension;

// =============================================================================
// Language Metadata Table
// =============================================================================

/// Which probe set applies to a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxFamily {
    /// JavaScript-like: braces, `function`, `class`, `import`
    Script,
    /// Indentation-scoped Python
    Python,
    /// Other brace languages; only generic probes apply
    Brace,
    /// Markup, styles, prose
    Markup,
    /// Data and configuration formats
    Data,
}

struct LanguageMeta {
    display_name: &'static str,
    highlight_str: &'static str,
    extensions: &'static [&'static str],
    aliases: &'static [&'static str],
    family: SyntaxFamily,
}

macro_rules! lang_meta {
    ($display:literal, $highlight:literal, [$($ext:literal),*], [$($alias:literal),*], $family:ident) => {
        LanguageMeta {
            display_name: $display,
            highlight_str: $highlight,
            extensions: &[$($ext),*],
            aliases: &[$($alias),*],
            family: SyntaxFamily::$family,
        }
    };
}

impl Language {
    fn meta(&self) -> LanguageMeta {
        match self {
            // Web
            Language::TypeScript => lang_meta!("TypeScript", "typescript", ["ts", "mts", "cts"], ["typescript", "ts"], Script),
            Language::JavaScript => lang_meta!("JavaScript", "javascript", ["js", "mjs", "cjs"], ["javascript", "js"], Script),
            Language::Tsx => lang_meta!("TSX", "tsx", ["tsx"], ["tsx"], Script),
            Language::Jsx => lang_meta!("JSX", "jsx", ["jsx"], ["jsx"], Script),
            Language::Vue => lang_meta!("Vue", "vue", ["vue"], ["vue"], Script),
            Language::Svelte => lang_meta!("Svelte", "svelte", ["svelte"], ["svelte"], Script),
            Language::Astro => lang_meta!("Astro", "astro", ["astro"], ["astro"], Script),
            Language::Html => lang_meta!("HTML", "html", ["html", "htm"], ["html"], Markup),
            Language::Css => lang_meta!("CSS", "css", ["css"], ["css"], Markup),
            Language::Scss => lang_meta!("SCSS", "scss", ["scss", "sass", "less", "styl"], ["scss", "sass", "less"], Markup),

            // Scripting
            Language::Python => lang_meta!("Python", "python", ["py", "pyi"], ["python", "py"], Python),
            Language::Ruby => lang_meta!("Ruby", "ruby", ["rb", "rake"], ["ruby", "rb"], Brace),
            Language::Php => lang_meta!("PHP", "php", ["php"], ["php"], Brace),
            Language::Bash => lang_meta!("Bash", "bash", ["sh", "bash", "zsh"], ["bash", "sh", "shell"], Brace),

            // Compiled
            Language::Rust => lang_meta!("Rust", "rust", ["rs"], ["rust"], Brace),
            Language::Go => lang_meta!("Go", "go", ["go"], ["go", "golang"], Brace),
            Language::Java => lang_meta!("Java", "java", ["java"], ["java"], Brace),
            Language::Kotlin => lang_meta!("Kotlin", "kotlin", ["kt", "kts"], ["kotlin", "kt"], Brace),
            Language::CSharp => lang_meta!("C#", "csharp", ["cs"], ["csharp", "c#", "cs"], Brace),
            Language::Swift => lang_meta!("Swift", "swift", ["swift"], ["swift"], Brace),
            Language::Dart => lang_meta!("Dart", "dart", ["dart"], ["dart"], Brace),
            Language::C => lang_meta!("C", "c", ["c", "h"], ["c"], Brace),
            Language::Cpp => lang_meta!("C++", "cpp", ["cpp", "cc", "cxx", "hpp"], ["cpp", "c++"], Brace),

            // Data/Config
            Language::Sql => lang_meta!("SQL", "sql", ["sql"], ["sql"], Data),
            Language::GraphQL => lang_meta!("GraphQL", "graphql", ["graphql", "gql"], ["graphql", "gql"], Data),
            Language::Prisma => lang_meta!("Prisma", "prisma", ["prisma"], ["prisma"], Data),
            Language::Yaml => lang_meta!("YAML", "yaml", ["yaml", "yml"], ["yaml", "yml"], Data),
            Language::Json => lang_meta!("JSON", "json", ["json", "jsonc"], ["json"], Data),
            Language::Toml => lang_meta!("TOML", "toml", ["toml"], ["toml"], Data),
            Language::Xml => lang_meta!("XML", "xml", ["xml"], ["xml"], Data),
            Language::Markdown => lang_meta!("Markdown", "markdown", ["md", "mdx", "markdown"], ["markdown", "md"], Markup),
            Language::Text => lang_meta!("Text", "text", ["txt", "rst"], ["text", "txt"], Markup),

            // Other
            Language::Makefile => lang_meta!("Makefile", "makefile", [], ["makefile", "make"], Data),
            Language::Dockerfile => lang_meta!("Dockerfile", "dockerfile", [], ["dockerfile", "docker"], Data),

            Language::Unknown => lang_meta!("Unknown", "text", [], ["unknown"], Data),
        }
    }
}

// =============================================================================
// Language Enum
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    TypeScript,
    JavaScript,
    Tsx,
    Jsx,
    Vue,
    Svelte,
    Astro,
    Html,
    Css,
    Scss,

    Python,
    Ruby,
    Php,
    Bash,

    Rust,
    Go,
    Java,
    Kotlin,
    CSharp,
    Swift,
    Dart,
    C,
    Cpp,

    Sql,
    GraphQL,
    Prisma,
    Yaml,
    Json,
    Toml,
    Xml,
    Markdown,
    Text,

    Makefile,
    Dockerfile,

    #[default]
    Unknown,
}

impl Language {
    const ALL: &'static [Language] = &[
        Language::TypeScript, Language::JavaScript, Language::Tsx, Language::Jsx,
        Language::Vue, Language::Svelte, Language::Astro, Language::Html,
        Language::Css, Language::Scss, Language::Python, Language::Ruby,
        Language::Php, Language::Bash, Language::Rust, Language::Go,
        Language::Java, Language::Kotlin, Language::CSharp, Language::Swift,
        Language::Dart, Language::C, Language::Cpp, Language::Sql,
        Language::GraphQL, Language::Prisma, Language::Yaml, Language::Json,
        Language::Toml, Language::Xml, Language::Markdown, Language::Text,
        Language::Makefile, Language::Dockerfile,
    ];

    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    /// Identifier for markdown code fences
    pub fn highlight_str(&self) -> &'static str {
        self.meta().highlight_str
    }

    pub fn family(&self) -> SyntaxFamily {
        self.meta().family
    }

    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.meta().extensions.contains(&ext_lower.as_str()))
            .unwrap_or(Language::Unknown)
    }

    /// Detect from a file name (not a full path)
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower == "makefile" || lower == "gnumakefile" {
            return Language::Makefile;
        }
        if lower == "dockerfile" || lower.starts_with("dockerfile.") {
            return Language::Dockerfile;
        }
        file_extension(name)
            .map(|ext| Self::from_extension(&ext))
            .unwrap_or(Language::Unknown)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Languages whose syntax supports TypeScript-style annotations
    pub fn is_typed_script(&self) -> bool {
        matches!(self, Language::TypeScript | Language::Tsx)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_lower = s.to_ascii_lowercase();
        if s_lower == "unknown" {
            return Ok(Language::Unknown);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.meta().aliases.contains(&s_lower.as_str()))
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("ts"), Language::TypeScript);
        assert_eq!(Language::from_extension("TSX"), Language::Tsx);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("mdx"), Language::Markdown);
        assert_eq!(Language::from_extension("xyz"), Language::Unknown);
    }

    #[test]
    fn test_from_file_name() {
        assert_eq!(Language::from_file_name("App.jsx"), Language::Jsx);
        assert_eq!(Language::from_file_name("Dockerfile.prod"), Language::Dockerfile);
        assert_eq!(Language::from_file_name("Makefile"), Language::Makefile);
        assert_eq!(Language::from_file_name("LICENSE"), Language::Unknown);
    }

    #[test]
    fn test_family() {
        assert_eq!(Language::Tsx.family(), SyntaxFamily::Script);
        assert_eq!(Language::Python.family(), SyntaxFamily::Python);
        assert_eq!(Language::Go.family(), SyntaxFamily::Brace);
        assert_eq!(Language::Css.family(), SyntaxFamily::Markup);
    }

    #[test]
    fn test_from_str_and_display() {
        assert_eq!("c#".parse::<Language>(), Ok(Language::CSharp));
        assert_eq!("JS".parse::<Language>(), Ok(Language::JavaScript));
        assert_eq!("klingon".parse::<Language>(), Err(()));
        assert_eq!(Language::Cpp.to_string(), "C++");
    }

    #[test]
    fn test_metadata_consistency() {
        for lang in Language::ALL {
            let meta = lang.meta();
            assert!(!meta.display_name.is_empty(), "Empty display name for {:?}", lang);
            assert!(!meta.highlight_str.is_empty(), "Empty highlight_str for {:?}", lang);
        }
    }
}
