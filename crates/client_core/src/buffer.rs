use std::path::Path;

use shared::domain::FileDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxMode {
    PlainText,
    Python,
    JavaScript,
    TypeScript,
    Json,
    Markdown,
    Html,
    Css,
    Yaml,
    Toml,
    Shell,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    Sql,
    Xml,
    Dockerfile,
    Makefile,
}

impl SyntaxMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SyntaxMode::PlainText => "plain text",
            SyntaxMode::Python => "python",
            SyntaxMode::JavaScript => "javascript",
            SyntaxMode::TypeScript => "typescript",
            SyntaxMode::Json => "json",
            SyntaxMode::Markdown => "markdown",
            SyntaxMode::Html => "html",
            SyntaxMode::Css => "css",
            SyntaxMode::Yaml => "yaml",
            SyntaxMode::Toml => "toml",
            SyntaxMode::Shell => "shell",
            SyntaxMode::Rust => "rust",
            SyntaxMode::Go => "go",
            SyntaxMode::Java => "java",
            SyntaxMode::C => "c",
            SyntaxMode::Cpp => "cpp",
            SyntaxMode::Sql => "sql",
            SyntaxMode::Xml => "xml",
            SyntaxMode::Dockerfile => "dockerfile",
            SyntaxMode::Makefile => "makefile",
        }
    }
}

/// Whole-filename matches, checked before extensions.
const FILENAME_MODES: &[(&str, SyntaxMode)] = &[
    ("dockerfile", SyntaxMode::Dockerfile),
    ("makefile", SyntaxMode::Makefile),
];

const EXTENSION_MODES: &[(&str, SyntaxMode)] = &[
    ("py", SyntaxMode::Python),
    ("js", SyntaxMode::JavaScript),
    ("mjs", SyntaxMode::JavaScript),
    ("cjs", SyntaxMode::JavaScript),
    ("ts", SyntaxMode::TypeScript),
    ("json", SyntaxMode::Json),
    ("md", SyntaxMode::Markdown),
    ("html", SyntaxMode::Html),
    ("htm", SyntaxMode::Html),
    ("css", SyntaxMode::Css),
    ("yml", SyntaxMode::Yaml),
    ("yaml", SyntaxMode::Yaml),
    ("toml", SyntaxMode::Toml),
    ("sh", SyntaxMode::Shell),
    ("bash", SyntaxMode::Shell),
    ("rs", SyntaxMode::Rust),
    ("go", SyntaxMode::Go),
    ("java", SyntaxMode::Java),
    ("c", SyntaxMode::C),
    ("h", SyntaxMode::C),
    ("cpp", SyntaxMode::Cpp),
    ("hpp", SyntaxMode::Cpp),
    ("cc", SyntaxMode::Cpp),
    ("sql", SyntaxMode::Sql),
    ("xml", SyntaxMode::Xml),
];

pub fn syntax_mode_for_path(path: &str) -> SyntaxMode {
    let path = Path::new(path);
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return SyntaxMode::PlainText;
    };
    let file_name = file_name.to_ascii_lowercase();
    if let Some((_, mode)) = FILENAME_MODES.iter().find(|(name, _)| *name == file_name) {
        return *mode;
    }

    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return SyntaxMode::PlainText;
    };
    let extension = extension.to_ascii_lowercase();
    EXTENSION_MODES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mode)| *mode)
        .unwrap_or(SyntaxMode::PlainText)
}

/// The external code-editing widget, reduced to what the workspace needs.
pub trait EditorWidget: Send {
    fn set_content(&mut self, text: &str);
    fn content(&self) -> String;
    fn set_mode(&mut self, mode: SyntaxMode);
    fn mode(&self) -> SyntaxMode;
}

#[derive(Debug, Clone)]
pub struct TextBufferWidget {
    text: String,
    mode: SyntaxMode,
}

impl Default for TextBufferWidget {
    fn default() -> Self {
        Self {
            text: String::new(),
            mode: SyntaxMode::PlainText,
        }
    }
}

impl EditorWidget for TextBufferWidget {
    fn set_content(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn content(&self) -> String {
        self.text.clone()
    }

    fn set_mode(&mut self, mode: SyntaxMode) {
        self.mode = mode;
    }

    fn mode(&self) -> SyntaxMode {
        self.mode
    }
}

pub struct DocumentBuffer<W: EditorWidget> {
    widget: W,
    original_content: Option<String>,
}

impl<W: EditorWidget> DocumentBuffer<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            original_content: None,
        }
    }

    pub fn bind(&mut self, document: &FileDocument) {
        self.widget.set_content(&document.content);
        self.widget.set_mode(syntax_mode_for_path(&document.path));
        self.original_content = Some(document.content.clone());
    }

    pub fn clear(&mut self) {
        self.widget.set_content("");
        self.widget.set_mode(SyntaxMode::PlainText);
        self.original_content = None;
    }

    /// Moves the clean baseline (and the mode, for a newly named file)
    /// without touching what the widget shows.
    pub fn rebase(&mut self, path: &str, original_content: &str) {
        self.widget.set_mode(syntax_mode_for_path(path));
        self.original_content = Some(original_content.to_string());
    }

    pub fn read_buffer(&self) -> String {
        self.widget.content()
    }

    pub fn edit(&mut self, text: &str) {
        self.widget.set_content(text);
    }

    pub fn is_dirty(&self) -> bool {
        match &self.original_content {
            Some(original) => self.widget.content() != *original,
            None => false,
        }
    }

    pub fn mode(&self) -> SyntaxMode {
        self.widget.mode()
    }
}
