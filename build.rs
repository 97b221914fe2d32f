use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use syntect::dumps::dump_to_uncompressed_file;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, css_for_theme_with_class_style};
use two_face::syntax;

const CODE_THEME: &str = "base16-ocean.dark";

fn main() {
    prepare_code_assets().expect("failed to prepare code highlighting assets");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=templates");
}

fn prepare_code_assets() -> Result<(), String> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").map_err(|err| err.to_string())?);
    write_syntax_pack(&out_dir)?;
    write_theme_css(&out_dir.join("code.css"))
}

fn write_theme_css(path: &Path) -> Result<(), String> {
    let theme_css = render_theme_css()?;

    let mut combined = String::with_capacity(theme_css.len() + 96);
    combined.push_str(&format!(
        "/* --- Syntect theme ({CODE_THEME}), generated at build time --- */\n"
    ));
    combined.push_str(&theme_css);
    combined.push('\n');

    fs::write(path, combined).map_err(|err| format!("failed to write {}: {err}", path.display()))?;
    println!("cargo:rustc-env=CODE_THEME_CSS_FILE={}", path.display());

    Ok(())
}

fn render_theme_css() -> Result<String, String> {
    let theme_set = ThemeSet::load_defaults();
    let theme = theme_set
        .themes
        .get(CODE_THEME)
        .ok_or_else(|| format!("theme `{CODE_THEME}` not found"))?;

    css_for_theme_with_class_style(theme, ClassStyle::SpacedPrefixed { prefix: "syntax-" })
        .map_err(|err| err.to_string())
}

fn write_syntax_pack(out_dir: &Path) -> Result<(), String> {
    let syntax_set = syntax::extra_newlines();
    let pack_path = out_dir.join("syntaxes.packdump");
    dump_to_uncompressed_file(&syntax_set, &pack_path)
        .map_err(|err| format!("failed to encode syntax set: {err}"))?;

    println!("cargo:rustc-env=SYNTAX_PACK_FILE={}", pack_path.display());

    Ok(())
}
