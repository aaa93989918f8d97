//! folio – command-line page reflow for rendered resume templates.
//!
//! Usage:
//!   folio <input.html> [--pdf out.pdf] [--json report.json] [--text]
//!         [--config config.json] [--adjustments gaps.json] [--width px] [--editor]
//!
//! Without an output flag the page count and offsets are printed.

use std::{env, fs, path::PathBuf, process};

use folio::config::ReflowConfig;
use folio::gaps::GapAdjustments;
use folio::pipeline::{export_pdf, export_text, paginate, DocumentState};
use folio::scale::ScaleContext;
use folio::FolioError;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut pdf_path: Option<PathBuf> = None;
    let mut json_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut adjustments_path: Option<PathBuf> = None;
    let mut width: Option<f32> = None;
    let mut text = false;
    let mut editor = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pdf" | "-o" => pdf_path = Some(PathBuf::from(value(&mut iter, arg, &args[0]))),
            "--json" | "-j" => json_path = Some(PathBuf::from(value(&mut iter, arg, &args[0]))),
            "--config" | "-c" => config_path = Some(PathBuf::from(value(&mut iter, arg, &args[0]))),
            "--adjustments" | "-a" => {
                adjustments_path = Some(PathBuf::from(value(&mut iter, arg, &args[0])))
            }
            "--width" | "-w" => {
                let raw = value(&mut iter, arg, &args[0]);
                match raw.parse::<f32>() {
                    Ok(w) => width = Some(w),
                    Err(_) => {
                        eprintln!("Invalid width: {raw}");
                        process::exit(1);
                    }
                }
            }
            "--text" => text = true,
            "--editor" => editor = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if input_path.is_some() {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                input_path = Some(PathBuf::from(path));
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let html = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let mut config = match &config_path {
        Some(path) => match ReflowConfig::from_path(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {e}", path.display());
                process::exit(1);
            }
        },
        None => ReflowConfig::default(),
    };
    if config_path.is_none() {
        if let Some(stem) = input.file_stem().and_then(|s| s.to_str()) {
            config.title = stem.to_string();
        }
    }

    let mut doc = DocumentState::new(html);
    if let Some(path) = &adjustments_path {
        let loaded = fs::read_to_string(path)
            .map_err(FolioError::from)
            .and_then(|s| GapAdjustments::from_json(&s));
        match loaded {
            Ok(adjustments) => doc.adjustments = adjustments,
            Err(e) => {
                eprintln!("Error loading adjustments '{}': {e}", path.display());
                process::exit(1);
            }
        }
    }

    let report = match paginate(&doc, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error paginating: {e}");
            process::exit(1);
        }
    };

    let pages = report.page_count;
    eprintln!(
        "{} page{}, {} unit{} pushed",
        pages,
        if pages == 1 { "" } else { "s" },
        report.offsets.len(),
        if report.offsets.len() == 1 { "" } else { "s" }
    );
    for offset in &report.offsets {
        let label = report
            .units
            .iter()
            .find(|u| u.id == offset.unit)
            .map(|u| u.label.as_str())
            .unwrap_or("");
        eprintln!("  #{:<4} +{:.1}px  {label}", offset.unit.0, offset.offset_px);
    }

    if let Some(w) = width {
        let context = if editor { ScaleContext::Editor } else { ScaleContext::Preview };
        let mut scale = config.scale_calculator(context);
        eprintln!("scale at {w}px: {}", scale.update(w));
    }

    if let Some(path) = &json_path {
        let written = report.to_json().and_then(|json| Ok(fs::write(path, json)?));
        if let Err(e) = written {
            eprintln!("Error writing '{}': {e}", path.display());
            process::exit(1);
        }
        eprintln!("Wrote '{}'", path.display());
    }

    if let Some(path) = &pdf_path {
        match export_pdf(&doc, &config) {
            Ok((bytes, _layout)) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        if let Err(e) = fs::create_dir_all(parent) {
                            eprintln!("Error creating output directory: {e}");
                            process::exit(1);
                        }
                    }
                }
                if let Err(e) = fs::write(path, &bytes) {
                    eprintln!("Error writing '{}': {e}", path.display());
                    process::exit(1);
                }
                eprintln!("Wrote '{}' ({} bytes)", path.display(), bytes.len());
            }
            Err(e) => {
                eprintln!("Error generating PDF: {e}");
                process::exit(1);
            }
        }
    }

    if text {
        print!("{}", export_text(&doc));
    }
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> &'a str {
    match iter.next() {
        Some(v) => v.as_str(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("folio – page reflow for rendered resume templates");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.html> [--pdf out.pdf] [--json report.json] [--text]");
    eprintln!("        [--config config.json] [--adjustments gaps.json] [--width px] [--editor]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input.html>        Rendered template to paginate");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --pdf, -o           Export a PDF, one page per virtual page");
    eprintln!("  --json, -j          Write the pagination report as JSON");
    eprintln!("  --text              Print the plain-text flattening to stdout");
    eprintln!("  --config, -c        Reflow config (JSON; every field optional)");
    eprintln!("  --adjustments, -a   Manual gap adjustments (JSON map of name to px)");
    eprintln!("  --width, -w         Container width to report the viewport scale for");
    eprintln!("  --editor            Use the editor scale bound instead of the preview");
    eprintln!("  --help              Print this message");
}
