use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use bitview_core::prelude::*;
use bitview_core::recognize::recognize_dynamic;
use bitview_utils::{debug, info, init_logging, init_logging_with_level, LogFormat, LogLevel};
use clap::{Parser, Subcommand};

/// Inspect bit-packed LLVM and Clang data structures.
#[derive(Parser, Debug)]
#[command(name = "bitview")]
#[command(version)]
#[command(about = "Decode bit-packed LLVM/Clang data structures from DWARF metadata and memory dumps", long_about = None)]
struct Cli
{
    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format (pretty or json); overrides BITVIEW_LOG_FORMAT
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
    /// Check the layout tables against the binary before decoding
    #[arg(long, global = true, default_value_t = false)]
    validate: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Check every layout table against a binary's debug info
    Validate
    {
        /// Binary (or separate debug file) carrying DWARF
        binary: PathBuf,
        /// Exit with an error when any table does not match
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print a type's members, enumerators and template arguments
    Describe
    {
        /// Binary (or separate debug file) carrying DWARF
        binary: PathBuf,
        /// Fully qualified type name, e.g. clang::QualType
        type_name: String,
    },
    /// Decode a value from a raw memory dump
    Decode
    {
        /// Binary (or separate debug file) carrying DWARF
        binary: PathBuf,
        /// Fully qualified type name of the value
        type_name: String,
        /// File holding the raw bytes of one memory region
        #[arg(long)]
        dump: PathBuf,
        /// Address of the first byte of the dump (hex format: 0x1000 or decimal)
        #[arg(long, value_parser = parse_address)]
        base: u64,
        /// Address of the value (hex format: 0x1000 or decimal)
        #[arg(long, value_parser = parse_address)]
        address: u64,
        /// How many levels of children to expand
        #[arg(short, long, default_value_t = 2)]
        depth: usize,
        /// Retype clang::Type and clang::Stmt values as their dynamic class first
        #[arg(long, default_value_t = false)]
        dynamic: bool,
    },
}

fn main()
{
    let cli = Cli::parse();

    // Explicit flags win over RUST_LOG and BITVIEW_LOG_FORMAT
    let logging = match (cli.log_level, cli.log_format) {
        (None, None) => init_logging(),
        (level, format) => init_logging_with_level(level.unwrap_or(LogLevel::Info), format.unwrap_or(LogFormat::Pretty)),
    };
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> DecodeResult<()>
{
    let mut config = SessionConfig::from_env();
    if cli.validate {
        config = config.validate_on_start(true);
    }

    match cli.command {
        Commands::Validate { binary, strict } => {
            let types = load_types(&binary)?;
            let session = Session::with_config(Arc::new(SnapshotMemory::new()), types, config);
            let reports = session.validate_layouts();
            let mut mismatched = 0;
            for report in &reports {
                print_report(report);
                if !report.is_clean() {
                    mismatched += 1;
                }
            }
            println!("\n{} of {} layout tables match", reports.len() - mismatched, reports.len());
            if strict && mismatched > 0 {
                return Err(DecodeError::InvalidArgument(format!(
                    "{mismatched} layout tables do not match {}",
                    binary.display()
                )));
            }
        }
        Commands::Describe { binary, type_name } => {
            let types = load_types(&binary)?;
            let session = Session::with_config(Arc::new(SnapshotMemory::new()), types, config);
            let ty = session.require_type(&type_name)?;
            print_descriptor(&ty);
        }
        Commands::Decode {
            binary,
            type_name,
            dump,
            base,
            address,
            depth,
            dynamic,
        } => {
            let types = load_types(&binary)?;
            let memory = SnapshotMemory::from_dump_file(&dump, base)?;
            info!(dump = %dump.display(), base = %Address::new(base), "loaded memory dump");
            let session = Session::with_config(Arc::new(memory), types, config);

            let mut value = session.value_at("value", &type_name, Address::new(address))?;
            if dynamic {
                match recognize_dynamic(&session, &value)? {
                    Some(recognized) => value = recognized,
                    None => debug!(type_name = %type_name, "no dynamic recognizer for this type"),
                }
            }
            print_value(&session, &value, 0, depth);
        }
    }

    Ok(())
}

fn load_types(binary: &Path) -> DecodeResult<Arc<DwarfTypeSystem>>
{
    let types = DwarfTypeSystem::load(binary)?;
    info!(binary = %binary.display(), "loaded debug info");
    Ok(Arc::new(types))
}

/// Parse an address given in hex (`0x` prefix) or decimal.
fn parse_address(text: &str) -> Result<u64, String>
{
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid address '{text}': {e}"))
}

fn print_report(report: &bitview_core::layouts::LayoutReport)
{
    if report.is_clean() {
        println!("{}: ok", report.layout);
        return;
    }
    if !report.enum_found {
        println!("{}: discriminant enum not found", report.layout);
        return;
    }

    println!("{}: mismatch", report.layout);
    let sections: [(&str, Vec<&str>); 4] = [
        ("enumerators without an entry", report.missing_entries.iter().map(String::as_str).collect()),
        ("entries without an enumerator", report.unknown_entries.clone()),
        ("missing derived types", report.missing_types.clone()),
        ("missing bits members", report.missing_bits.clone()),
    ];
    for (label, names) in sections {
        if !names.is_empty() {
            println!("  {label}: {}", names.join(", "));
        }
    }
}

fn print_descriptor(ty: &TypeDescriptor)
{
    println!("{} ({} bytes, {:?})", ty.name, ty.byte_size, ty.kind);
    if let Some(kind) = AggregateKind::recognize(&ty.name) {
        println!("  decoded as: {kind}");
    }

    if !ty.template_args.is_empty() {
        println!("  template arguments:");
        for (index, arg) in ty.template_args.iter().enumerate() {
            match arg {
                TemplateArg::Type(name) => println!("    [{index}] {name}"),
                TemplateArg::Value {
                    type_name,
                    value: Some(value),
                } => println!("    [{index}] {type_name} = {value}"),
                TemplateArg::Value { type_name, value: None } => println!("    [{index}] {type_name}"),
            }
        }
    }

    if !ty.members.is_empty() {
        println!("  members:");
        for member in &ty.members {
            let name = match (&member.name, member.is_base) {
                (_, true) => "(base)".to_string(),
                (Some(name), false) => name.clone(),
                (None, false) => "(anonymous)".to_string(),
            };
            match member.bits {
                Some(bits) => println!(
                    "    +{:<4} {name}: {} : {} @ bit {}",
                    member.byte_offset, member.type_name, bits.size, bits.offset
                ),
                None => println!("    +{:<4} {name}: {}", member.byte_offset, member.type_name),
            }
        }
    }

    if !ty.enumerators.is_empty() {
        println!("  enumerators:");
        for enumerator in &ty.enumerators {
            println!("    {} = {}", enumerator.name, enumerator.value);
        }
    }
}

/// Print a value and, down to `depth` levels, the children its view lists.
fn print_value(session: &Session, value: &Value, indent: usize, depth: usize)
{
    let pad = "  ".repeat(indent);
    match scalar_text(session, value) {
        Some(text) => println!("{pad}({}) {} = {text}", value.ty.name, value.name),
        None => println!("{pad}({}) {}", value.ty.name, value.name),
    }
    if depth == 0 || !is_expandable(value) {
        return;
    }

    let mut view = session.view(value.clone());
    match view.status() {
        ViewStatus::Fallback { kind, reason, .. } => {
            println!("{pad}  <could not format as {kind}: {reason}>");
        }
        ViewStatus::Unavailable { reason } => {
            println!("{pad}  <unavailable: {reason}>");
            return;
        }
        ViewStatus::Plain | ViewStatus::Decoded(_) => {}
    }

    for child in view.children() {
        match child {
            ChildValue::Value(child) => print_value(session, &child, indent + 1, depth - 1),
            unavailable @ ChildValue::Unavailable(_) => println!("{pad}  {unavailable}"),
        }
    }
}

fn is_expandable(value: &Value) -> bool
{
    matches!(value.ty.kind, TypeKind::Struct | TypeKind::Union)
        || (value.ty.is_pointer() && value.ty.target_name().and_then(AggregateKind::recognize).is_some())
}

fn scalar_text(session: &Session, value: &Value) -> Option<String>
{
    let text = match &value.ty.kind {
        TypeKind::Scalar(ScalarKind::Bool) => match session.read_unsigned(value) {
            Ok(raw) => (raw != 0).to_string(),
            Err(e) => format!("<unavailable: {e}>"),
        },
        TypeKind::Scalar(ScalarKind::Float) => return None,
        TypeKind::Scalar(_) => match session.read_unsigned(value) {
            Ok(raw) => raw.to_string(),
            Err(e) => format!("<unavailable: {e}>"),
        },
        TypeKind::Pointer { .. } | TypeKind::Reference { .. } => match session.read_unsigned(value) {
            Ok(raw) => format!("{raw:#x}"),
            Err(e) => format!("<unavailable: {e}>"),
        },
        TypeKind::Enum => match (session.read_unsigned(value), session.enumerator_name(value)) {
            (Ok(raw), Ok(Some(name))) => format!("{name} ({raw})"),
            (Ok(raw), _) => raw.to_string(),
            (Err(e), _) => format!("<unavailable: {e}>"),
        },
        TypeKind::Struct | TypeKind::Union | TypeKind::Array { .. } | TypeKind::Opaque => return None,
    };
    Some(text)
}
