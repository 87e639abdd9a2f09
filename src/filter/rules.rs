//! Deny-lists, allow-lists and category decisions

use crate::types::{NodeCategory, file_extension};

// =============================================================================
// Directories
// =============================================================================

const DENIED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    ".output",
    ".svelte-kit",
    ".vercel",
    ".netlify",
    "coverage",
    ".nyc_output",
    ".cache",
    ".vscode",
    ".idea",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".venv",
    "venv",
    "vendor",
    "target",
    "bower_components",
    "jspm_packages",
    "storybook-static",
    "tmp",
    ".tmp",
];

const DENIED_DIR_PREFIXES: &[&str] = &[".turbo", ".parcel-cache", "build-", "dist-", "coverage-"];

pub fn is_denied_dir(name: &str) -> bool {
    DENIED_DIRS.contains(&name) || DENIED_DIR_PREFIXES.iter().any(|p| name.starts_with(p))
}

// =============================================================================
// Files
// =============================================================================

const DENIED_FILE_NAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "cargo.lock",
    "poetry.lock",
    "pipfile.lock",
    "composer.lock",
    "gemfile.lock",
    "go.sum",
    ".ds_store",
    "thumbs.db",
    ".npmrc",
    ".yarnrc",
];

const DENIED_SUFFIXES: &[&str] = &[
    ".min.js", ".min.css", ".min.mjs", ".bundle.js", ".chunk.js", ".chunk.css", ".map", ".d.ts",
    ".log", ".lock",
    // images
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".bmp", ".tiff", ".avif",
    // fonts
    ".woff", ".woff2", ".ttf", ".otf", ".eot",
    // binaries, archives, media
    ".exe", ".dll", ".so", ".dylib", ".bin", ".o", ".a", ".class", ".jar", ".wasm", ".pyc",
    ".zip", ".tar", ".gz", ".rar", ".7z", ".pdf", ".mp3", ".mp4", ".mov", ".avi", ".sqlite",
    ".db",
];

/// Lockfiles, OS droppings, secrets and logs
pub fn is_denied_file_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DENIED_FILE_NAMES.contains(&lower.as_str())
        || lower == ".env"
        || (lower.starts_with(".env.") && !lower.ends_with(".example"))
        || lower.starts_with("npm-debug.log")
        || lower.starts_with("yarn-error.log")
}

pub fn has_denied_suffix(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DENIED_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

// =============================================================================
// Extension Allow-List
// =============================================================================

const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts", "vue", "svelte", "astro", "py", "rb",
    "php", "go", "rs", "java", "kt", "kts", "cs", "swift", "dart", "c", "h", "cpp", "cc", "hpp",
    "sh", "bash", "sql", "graphql", "gql", "prisma", "html", "htm",
];

const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less", "styl"];

const CONFIG_EXTENSIONS: &[&str] = &["json", "jsonc", "yaml", "yml", "toml", "xml", "ini", "cfg"];

const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "rst", "txt", "markdown"];

/// Known config files without a usable extension
const EXTENSIONLESS_CONFIG: &[&str] = &[
    "dockerfile",
    "makefile",
    "procfile",
    "gemfile",
    "rakefile",
    ".gitignore",
    ".dockerignore",
    ".editorconfig",
    ".nvmrc",
    ".babelrc",
    ".prettierrc",
    ".eslintrc",
    ".env.example",
];

/// Dependency-declaration files; always kept and always `Config`
const MANIFEST_NAMES: &[&str] = &[
    "package.json",
    "cargo.toml",
    "requirements.txt",
    "pyproject.toml",
    "go.mod",
    "composer.json",
    "gemfile",
    "pipfile",
];

pub fn is_manifest_name(name: &str) -> bool {
    MANIFEST_NAMES.contains(&name.to_ascii_lowercase().as_str())
}

fn is_extensionless_config(lower: &str) -> bool {
    EXTENSIONLESS_CONFIG.contains(&lower) || lower.starts_with("dockerfile.")
}

pub fn is_allowed_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if is_extensionless_config(&lower) {
        return true;
    }
    match file_extension(&lower) {
        Some(ext) => {
            let ext = ext.as_str();
            SOURCE_EXTENSIONS.contains(&ext)
                || STYLE_EXTENSIONS.contains(&ext)
                || CONFIG_EXTENSIONS.contains(&ext)
                || DOC_EXTENSIONS.contains(&ext)
        }
        None => false,
    }
}

pub fn is_code_extension(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| {
        SOURCE_EXTENSIONS.contains(&ext.as_str()) || STYLE_EXTENSIONS.contains(&ext.as_str())
    })
}

// =============================================================================
// Toggleable Classes
// =============================================================================

pub fn is_test_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let name = lower.rsplit('/').next().unwrap_or(&lower);

    name.contains(".test.")
        || name.contains(".spec.")
        || name.contains(".e2e.")
        || (name.starts_with("test_") && name.ends_with(".py"))
        || name.ends_with("_test.py")
        || name.ends_with("_test.go")
        || name == "conftest.py"
        || ["__tests__/", "__mocks__/", "tests/", "test/", "e2e/", "cypress/", "spec/"]
            .iter()
            .any(|dir| lower.starts_with(dir) || lower.contains(&format!("/{}", dir)))
}

pub fn is_style_file(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| STYLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Tool configuration (bundler, compiler, linter, formatter, test runner)
pub fn is_build_config_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if is_manifest_name(&lower) {
        return false;
    }
    const TOOL_PREFIXES: &[&str] = &[
        "webpack.", "vite.", "vitest.", "rollup.", "babel.", "jest.", "karma.", "postcss.",
        "tailwind.", "next.config", "nuxt.config", "svelte.config", "astro.config", "eslint.",
        "prettier.", "stylelint.", "playwright.", "cypress.config", "gulpfile", "gruntfile",
        "tsconfig", "jsconfig", "esbuild.", "turbo.json", "nx.json", "lerna.json",
    ];
    TOOL_PREFIXES.iter().any(|p| lower.starts_with(p))
        || (lower.starts_with('.') && lower.contains("rc"))
        || lower.contains(".config.")
}

// =============================================================================
// Category Decision
// =============================================================================

fn is_config_name(lower: &str) -> bool {
    is_manifest_name(lower)
        || is_extensionless_config(lower)
        || is_build_config_file(lower)
        || lower.starts_with("docker-compose")
        || lower.starts_with(".env")
}

/// Category for a surviving file, in fixed decision order
pub fn categorize(name: &str) -> NodeCategory {
    let lower = name.to_ascii_lowercase();

    if is_config_name(&lower) {
        return NodeCategory::Config;
    }

    let ext = file_extension(&lower);
    if lower.contains("readme") || ext.as_deref().is_some_and(|e| DOC_EXTENSIONS.contains(&e)) {
        return NodeCategory::Documentation;
    }

    match ext.as_deref() {
        Some(e) if STYLE_EXTENSIONS.contains(&e) => NodeCategory::Style,
        Some(e) if CONFIG_EXTENSIONS.contains(&e) => NodeCategory::Config,
        _ => NodeCategory::Source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_dirs() {
        assert!(is_denied_dir("node_modules"));
        assert!(is_denied_dir(".turbo-cache"));
        assert!(is_denied_dir("dist-legacy"));
        assert!(!is_denied_dir("src"));
        assert!(!is_denied_dir("distribution"));
    }

    #[test]
    fn test_denied_files() {
        assert!(is_denied_file_name("package-lock.json"));
        assert!(is_denied_file_name(".env.local"));
        assert!(!is_denied_file_name(".env.example"));
        assert!(has_denied_suffix("vendor.min.js"));
        assert!(has_denied_suffix("types.d.ts"));
        assert!(has_denied_suffix("Logo.PNG"));
        assert!(!has_denied_suffix("App.tsx"));
    }

    #[test]
    fn test_allow_list() {
        assert!(is_allowed_extension("main.go"));
        assert!(is_allowed_extension("Dockerfile"));
        assert!(is_allowed_extension("README.md"));
        assert!(!is_allowed_extension("LICENSE"));
        assert!(!is_allowed_extension("archive.tar.xz"));
    }

    #[test]
    fn test_toggle_classes() {
        assert!(is_test_file("src/App.test.tsx"));
        assert!(is_test_file("src/__tests__/util.ts"));
        assert!(is_test_file("tests/test_api.py"));
        assert!(!is_test_file("src/contest.ts"));
        assert!(!is_test_file("src/latest/feed.ts"));
        assert!(is_style_file("theme.scss"));
        assert!(is_build_config_file("vite.config.ts"));
        assert!(is_build_config_file("tsconfig.json"));
        assert!(is_build_config_file(".eslintrc.json"));
        assert!(!is_build_config_file("package.json"));
        assert!(!is_build_config_file("config.ts"));
    }

    #[test]
    fn test_category_order() {
        assert_eq!(categorize("package.json"), NodeCategory::Config);
        assert_eq!(categorize("Dockerfile"), NodeCategory::Config);
        assert_eq!(categorize("README.txt"), NodeCategory::Documentation);
        assert_eq!(categorize("guide.mdx"), NodeCategory::Documentation);
        assert_eq!(categorize("styles.css"), NodeCategory::Style);
        assert_eq!(categorize("settings.yaml"), NodeCategory::Config);
        assert_eq!(categorize("App.tsx"), NodeCategory::Source);
        assert_eq!(categorize("weird"), NodeCategory::Source);
    }
}
