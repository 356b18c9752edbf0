use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use memmap2::Mmap;
use serde::Deserialize;

use dexlift_front::{
    Frontend, MethodCfg, OwnedMethodBody, SsaBuilder, SsaInstruction, SymbolTable, TablePool,
    decode_method,
};
use dexlift_ir::{
    BlockKind, ClassHierarchy, ConstValue, EdgeKind, FieldRef, MethodRef, Op, RawHandler,
    TryRegion, TypeRef,
};

#[derive(Parser)]
#[command(name = "dexlift", about = "Dalvik method bytecode front end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded instruction listing of one method's code
    Disasm {
        /// Raw little-endian code units
        input: PathBuf,
        /// YAML sidecar with pool, registers and try regions
        #[arg(long)]
        meta: Option<PathBuf>,
    },
    /// Print basic blocks and normal/exceptional edges
    Cfg {
        /// Raw little-endian code units
        input: PathBuf,
        /// YAML sidecar with pool, registers and try regions
        #[arg(long)]
        meta: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Disasm { input, meta } => cmd_disasm(&input, meta.as_deref()),
        Commands::Cfg { input, meta } => cmd_cfg(&input, meta.as_deref()),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

// === YAML sidecar ===

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Meta {
    registers: u16,
    parameters: u16,
    types: Vec<String>,
    fields: Vec<FieldMeta>,
    methods: Vec<MethodMeta>,
    strings: Vec<String>,
    try_regions: Vec<TryMeta>,
    known_types: Vec<String>,
    /// (subtype, supertype) pairs, reflexivity implied.
    subtypes: Vec<(String, String)>,
    /// Declared checked exceptions keyed by `Lclass;->name(sig)` form.
    declared_exceptions: BTreeMap<String, Vec<String>>,
}

impl Default for Meta {
    fn default() -> Self {
        Meta {
            registers: 16,
            parameters: 0,
            types: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            strings: Vec::new(),
            try_regions: Vec::new(),
            known_types: Vec::new(),
            subtypes: Vec::new(),
            declared_exceptions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FieldMeta {
    class: String,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Debug, Deserialize)]
struct MethodMeta {
    class: String,
    name: String,
    descriptor: String,
}

#[derive(Debug, Deserialize)]
struct TryMeta {
    start: u32,
    end: u32,
    handlers: Vec<HandlerMeta>,
}

#[derive(Debug, Deserialize)]
struct HandlerMeta {
    addr: u32,
    #[serde(rename = "type", default)]
    catch_type: Option<String>,
}

impl Meta {
    fn load(path: Option<&Path>) -> Result<Meta, Box<dyn Error>> {
        match path {
            Some(p) => Ok(serde_yaml::from_reader(File::open(p)?)?),
            None => Ok(Meta::default()),
        }
    }

    fn body(&self, code: Vec<u8>) -> OwnedMethodBody {
        OwnedMethodBody {
            reference: MethodRef {
                class: TypeRef::from_descriptor("Lcli/Input;"),
                name: "method".into(),
                descriptor: "()V".into(),
            },
            code,
            register_count: self.registers,
            parameter_count: self.parameters,
            try_regions: self
                .try_regions
                .iter()
                .map(|t| TryRegion {
                    start_addr: t.start,
                    end_addr: t.end,
                    handlers: t
                        .handlers
                        .iter()
                        .map(|h| RawHandler {
                            handler_addr: h.addr,
                            catch_type: h
                                .catch_type
                                .as_deref()
                                .map(TypeRef::from_descriptor),
                        })
                        .collect(),
                })
                .collect(),
            pool: TablePool {
                types: self
                    .types
                    .iter()
                    .map(|t| TypeRef::from_descriptor(t.as_str()))
                    .collect(),
                fields: self
                    .fields
                    .iter()
                    .map(|f| FieldRef {
                        class: TypeRef::from_descriptor(f.class.as_str()),
                        name: f.name.clone(),
                        field_type: TypeRef::from_descriptor(f.field_type.as_str()),
                    })
                    .collect(),
                methods: self
                    .methods
                    .iter()
                    .map(|m| MethodRef {
                        class: TypeRef::from_descriptor(m.class.as_str()),
                        name: m.name.clone(),
                        descriptor: m.descriptor.clone(),
                    })
                    .collect(),
                strings: self.strings.clone(),
            },
        }
    }

    fn hierarchy(&self) -> TableHierarchy {
        TableHierarchy {
            known: self.known_types.iter().cloned().collect(),
            subtypes: self.subtypes.iter().cloned().collect(),
            declared: self
                .declared_exceptions
                .iter()
                .map(|(k, v)| {
                    let types = v
                        .iter()
                        .map(|t| TypeRef::from_descriptor(t.as_str()))
                        .collect();
                    (k.clone(), types)
                })
                .collect(),
        }
    }
}

/// A table-driven hierarchy from the sidecar. With no facts it resolves
/// nothing and every edge degrades conservatively.
#[derive(Debug, Default)]
struct TableHierarchy {
    known: HashSet<String>,
    subtypes: HashSet<(String, String)>,
    declared: BTreeMap<String, Vec<TypeRef>>,
}

impl ClassHierarchy for TableHierarchy {
    fn resolves(&self, ty: &TypeRef) -> bool {
        self.known.contains(ty.descriptor())
    }

    fn subtype_of(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        sub == sup
            || self
                .subtypes
                .contains(&(sub.descriptor().to_string(), sup.descriptor().to_string()))
    }

    fn resolve_declared_exceptions(&self, callee: &MethodRef) -> Option<Vec<TypeRef>> {
        self.declared.get(&callee.to_string()).cloned()
    }
}

/// The CLI never lifts to SSA; an empty builder satisfies the pipeline.
struct NoSsa;

impl SsaBuilder for NoSsa {
    fn build(&self, _method: &MethodCfg, _symbols: &mut SymbolTable) -> Vec<SsaInstruction> {
        Vec::new()
    }
}

fn map_input(path: &Path) -> Result<Mmap, Box<dyn Error>> {
    let file = File::open(path)?;
    Ok(unsafe { Mmap::map(&file)? })
}

// === disasm ===

fn cmd_disasm(input: &Path, meta: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let code = map_input(input)?;
    let meta = Meta::load(meta)?;
    let body = meta.body(code.to_vec());
    let decoded = decode_method(&body)?;

    for ins in &decoded.instructions {
        let ops = operands(&ins.op);
        if ops.is_empty() {
            println!("{:04x}: {}", ins.addr, ins.opcode);
        } else {
            println!("{:04x}: {} {}", ins.addr, ins.opcode, ops);
        }
    }
    println!("; {} instructions", decoded.instructions.len());
    Ok(())
}

fn const_value(value: &ConstValue) -> String {
    match value {
        ConstValue::Int(v) => format!("#{v}"),
        ConstValue::Wide(v) => format!("#{v}L"),
        ConstValue::String(s) => format!("{s:?}"),
        ConstValue::Class(t) => t.to_string(),
    }
}

fn regs(rs: &[u16]) -> String {
    let list: Vec<String> = rs.iter().map(|r| format!("v{r}")).collect();
    list.join(", ")
}

fn operands(op: &Op) -> String {
    match op {
        Op::Nop => String::new(),
        Op::Move { dest, src, .. } => format!("v{dest}, v{src}"),
        Op::MoveException { dest, .. } => format!("v{dest}"),
        Op::Return { value: None, .. } => String::new(),
        Op::Return {
            value: Some(r), ..
        } => format!("v{r}"),
        Op::Const { dest, value } => format!("v{dest}, {}", const_value(value)),
        Op::MonitorEnter { object } | Op::MonitorExit { object } => format!("v{object}"),
        Op::CheckCast { object, ty } => format!("v{object}, {ty}"),
        Op::InstanceOf { dest, object, ty } => format!("v{dest}, v{object}, {ty}"),
        Op::ArrayLength { dest, array } => format!("v{dest}, v{array}"),
        Op::NewInstance { dest, ty } => format!("v{dest}, {ty}"),
        Op::NewArray { dest, size, ty } => format!("v{dest}, v{size}, {ty}"),
        Op::FilledNewArray { ty, args, .. } => format!("{{{}}}, {ty}", regs(args)),
        Op::FillArrayData {
            array,
            table_offset,
            element_ty,
            data,
        } => {
            let linked = match data {
                Some(d) => format!("{} bytes", d.data.len()),
                None => "unlinked".to_string(),
            };
            format!("v{array}, {table_offset:+} ({element_ty}, {linked})")
        }
        Op::Throw { exception } => format!("v{exception}"),
        Op::Goto { target } => format!("@{target:04x}"),
        Op::Switch {
            value,
            targets,
            default,
            ..
        } => {
            let ts: Vec<String> = targets.iter().map(|t| format!("@{t:04x}")).collect();
            format!("v{value}, [{}] default @{default:04x}", ts.join(", "))
        }
        Op::Compare {
            dest, left, right, ..
        } => format!("v{dest}, v{left}, v{right}"),
        Op::If {
            left,
            right: Some(r),
            target,
            ..
        } => format!("v{left}, v{r}, @{target:04x}"),
        Op::If {
            left,
            right: None,
            target,
            ..
        } => format!("v{left}, @{target:04x}"),
        Op::ArrayGet {
            dest, array, index, ..
        } => format!("v{dest}, v{array}, v{index}"),
        Op::ArrayPut {
            src, array, index, ..
        } => format!("v{src}, v{array}, v{index}"),
        Op::InstanceGet {
            dest,
            object,
            field,
            ..
        } => format!("v{dest}, v{object}, {field}"),
        Op::InstancePut {
            src,
            object,
            field,
            ..
        } => format!("v{src}, v{object}, {field}"),
        Op::StaticGet { dest, field, .. } => format!("v{dest}, {field}"),
        Op::StaticPut { src, field, .. } => format!("v{src}, {field}"),
        Op::Invoke { method, args, .. } => format!("{{{}}}, {method}", regs(args)),
        Op::Unary { dest, src, .. } => format!("v{dest}, v{src}"),
        Op::Binary {
            dest, left, right, ..
        } => format!("v{dest}, v{left}, v{right}"),
        Op::BinaryLit {
            dest, src, literal, ..
        } => format!("v{dest}, v{src}, #{literal}"),
    }
}

// === cfg ===

fn cmd_cfg(input: &Path, meta: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let code = map_input(input)?;
    let meta = Meta::load(meta)?;
    let body = meta.body(code.to_vec());
    let frontend = Frontend::new(meta.hierarchy(), Box::new(NoSsa));
    let m = frontend.make_cfg(&body)?;

    for block in m.cfg.blocks() {
        let n = block.number();
        match block.kind() {
            BlockKind::Entry => println!("block {n} (entry)"),
            BlockKind::Exit => println!("block {n} (exit)"),
            BlockKind::Code { first, last } => {
                let lo = m.index.address_of(first)?;
                let hi = m.index.address_of(last)?;
                let catch = if block.is_catch_block() { " catch" } else { "" };
                println!("block {n} [{first}..={last}] @{lo:04x}..@{hi:04x}{catch}");
            }
        }
        for &s in m.cfg.succs(n, EdgeKind::Normal) {
            println!("  -> {s}");
        }
        for &s in m.cfg.succs(n, EdgeKind::Exceptional) {
            println!("  => {s}");
        }
    }
    for w in m.diagnostics.warnings() {
        println!("warning: {w}");
    }
    println!(
        "; {} instructions, {} edges",
        m.diagnostics.instructions_decoded, m.diagnostics.edges_added
    );
    Ok(())
}
