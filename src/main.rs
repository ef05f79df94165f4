use std::{env, fs::read_to_string, io, path::Path, process::exit};

use inkwell::{
    context::Context,
    targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine},
    OptimizationLevel,
};

use kaleido::{
    display_error,
    lexer::source::{BufferedSource, StreamingSource},
    session::driver::{AotSession, JitSession, UnitOutcome},
};

#[derive(PartialEq, Clone, Copy)]
enum Emit {
    Object,
    Assembly,
    LlvmIr,
}

fn main() {
    let mut emit = Emit::Object;
    let mut input: Option<String> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-S" => emit = Emit::Assembly,
            "--emit-llvm" => emit = Emit::LlvmIr,
            flag if flag.starts_with('-') => {
                eprintln!("unknown flag: {}", flag);
                eprintln!("usage: kaleido [-S | --emit-llvm] [file.kpe]");
                exit(2);
            }
            path => {
                if input.replace(path.to_string()).is_some() {
                    eprintln!("usage: kaleido [-S | --emit-llvm] [file.kpe]");
                    exit(2);
                }
            }
        }
    }

    match input {
        Some(path) => compile_file(&path, emit),
        None => run_repl(),
    }
}

/// Interactive mode: read units from stdin, JIT them, print values.
fn run_repl() {
    let context = Context::create();
    let source = StreamingSource::new(io::stdin().lock(), true);

    let mut session = match JitSession::new(&context, Box::new(source)) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
            exit(1);
        }
    };

    session.run();
}

/// Batch mode: compile a whole file into one module and write it out as an
/// object file, assembly, or LLVM IR next to the input.
fn compile_file(path: &str, emit: Emit) {
    let contents = match read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            eprintln!("failed to read {}: {}", path, error);
            exit(1);
        }
    };

    let file_name = path.rsplit('/').next().unwrap_or(path).to_string();

    let context = Context::create();
    let source = match BufferedSource::new(contents.clone(), Some(file_name.clone())) {
        Ok(source) => source,
        Err(error) => {
            display_error(&error, &contents, path);
            exit(1);
        }
    };

    let mut session = match AotSession::new(&context, Box::new(source), &file_name) {
        Ok(session) => session,
        Err(error) => {
            display_error(&error, &contents, path);
            exit(1);
        }
    };

    let mut failed = false;
    loop {
        match session.run_one() {
            Ok(UnitOutcome::End) => break,
            Ok(_) => {}
            Err(error) => {
                display_error(&error, &contents, path);
                failed = true;
            }
        }
    }

    if failed {
        exit(1);
    }

    write_output(&session, path, emit);
}

fn write_output(session: &AotSession<'_>, input_path: &str, emit: Emit) {
    Target::initialize_all(&InitializationConfig::default());

    let triple = TargetMachine::get_default_triple();
    let triple_name = triple.as_str().to_string_lossy().into_owned();

    let target = match Target::from_triple(&triple) {
        Ok(target) => target,
        Err(error) => {
            eprintln!("no target for {}: {}", triple_name, error);
            exit(1);
        }
    };

    let Some(machine) = target.create_target_machine(
        &triple,
        "generic",
        "",
        OptimizationLevel::Default,
        RelocMode::PIC,
        CodeModel::Default,
    ) else {
        eprintln!("could not create a target machine for {}", triple_name);
        exit(1);
    };

    session.module.set_triple(&triple);
    session
        .module
        .set_data_layout(&machine.get_target_data().get_data_layout());

    let stem = input_path.strip_suffix(".kpe").unwrap_or(input_path);
    let output = match emit {
        Emit::Object => format!("{}.o", stem),
        Emit::Assembly => format!("{}.s", stem),
        Emit::LlvmIr => format!("{}.ll", stem),
    };

    let written = match emit {
        Emit::LlvmIr => session
            .module
            .print_to_file(Path::new(&output))
            .map_err(|error| error.to_string()),
        Emit::Assembly => machine
            .write_to_file(&session.module, FileType::Assembly, Path::new(&output))
            .map_err(|error| error.to_string()),
        Emit::Object => machine
            .write_to_file(&session.module, FileType::Object, Path::new(&output))
            .map_err(|error| error.to_string()),
    };

    if let Err(message) = written {
        eprintln!("failed to write {}: {}", output, message);
        exit(1);
    }

    eprintln!("wrote {}", output);
}
