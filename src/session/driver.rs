//! Unit-at-a-time drivers over the parser and code generator.
//!
//! [`JitSession`] generates each top-level unit into its own module and
//! hands it to one persistent MCJIT engine. Anonymous expressions are
//! executed and their module removed again, so repeated evaluation never
//! collides on the anonymous symbol; definition modules stay resident for
//! later units to call into. [`AotSession`] accumulates everything into a
//! single module instead and never executes anything.

use inkwell::{
    context::Context,
    execution_engine::ExecutionEngine,
    module::Module,
    targets::{InitializationConfig, Target},
    OptimizationLevel,
};

use crate::{
    ast::ast::Item,
    compiler::{compiler::Compiler, intrinsics::INTRINSICS, item::gen_item},
    errors::errors::{Error, ErrorImpl, ErrorTip},
    lexer::source::TokenSource,
    parser::{item::parse_top_level_unit, parser::Parser},
    Position,
};

use super::session::Session;

/// What one top-level unit amounted to.
#[derive(Debug, PartialEq)]
pub enum UnitOutcome {
    /// A `def` was compiled; carries the function name.
    Defined(String),
    /// An `extern` was declared; carries the function name.
    Declared(String),
    /// An anonymous expression was executed; carries its value.
    Evaluated(f64),
    /// End of input.
    End,
}

pub struct JitSession<'ctx> {
    context: &'ctx Context,
    session: Session,
    parser: Parser,
    engine: ExecutionEngine<'ctx>,
    /// Modules the engine still owns symbols from. The bootstrap module is
    /// index 0; definition modules accumulate behind it.
    modules: Vec<Module<'ctx>>,
    unit_counter: u32,
}

impl<'ctx> JitSession<'ctx> {
    pub fn new(context: &'ctx Context, source: Box<dyn TokenSource>) -> Result<Self, Error> {
        Target::initialize_native(&InitializationConfig::default()).map_err(|message| {
            Error::new(ErrorImpl::BackendError { message }, Position::null())
        })?;

        // The engine needs a module to be born from; it stays empty.
        let bootstrap = context.create_module("jit");
        let engine = bootstrap
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|message| {
                Error::new(
                    ErrorImpl::BackendError {
                        message: message.to_string(),
                    },
                    Position::null(),
                )
            })?;

        Ok(JitSession {
            context,
            session: Session::new(),
            parser: Parser::new(source)?,
            engine,
            modules: vec![bootstrap],
            unit_counter: 0,
        })
    }

    /// Parses, generates, and (for an anonymous expression) executes one
    /// unit. A parse error leaves the parser resynchronized at the next
    /// plausible unit boundary; a generation error needs no recovery, the
    /// parser already sits past the failed unit.
    pub fn run_one(&mut self) -> Result<UnitOutcome, Error> {
        let item = match parse_top_level_unit(&mut self.parser, &mut self.session) {
            Ok(Some(item)) => item,
            Ok(None) => return Ok(UnitOutcome::End),
            Err(error) => {
                self.parser.synchronize();
                return Err(error);
            }
        };

        let module = self.context.create_module(&format!("unit{}", self.unit_counter));
        self.unit_counter += 1;
        module.set_data_layout(&self.engine.get_target_data().get_data_layout());

        {
            let mut compiler = Compiler::new(self.context, &module);
            gen_item(&mut compiler, &mut self.session, &item)?;
        }

        match item {
            Item::Extern(proto) => Ok(UnitOutcome::Declared(proto.name)),
            Item::Definition(definition) if definition.is_anonymous => {
                let name = definition.proto.name;
                let position = definition.proto.span.start;

                self.add_module(&module, &position)?;
                let value = self.execute(&name, &position);
                let removed = self.engine.remove_module(&module);

                let value = value?;
                removed.map_err(|message| {
                    Error::new(
                        ErrorImpl::BackendError {
                            message: message.to_string(),
                        },
                        position.clone(),
                    )
                })?;

                Ok(UnitOutcome::Evaluated(value))
            }
            Item::Definition(definition) => {
                let position = definition.proto.span.start;
                self.add_module(&module, &position)?;
                self.modules.push(module);

                Ok(UnitOutcome::Defined(definition.proto.name))
            }
        }
    }

    fn add_module(&self, module: &Module<'ctx>, position: &Position) -> Result<(), Error> {
        self.engine.add_module(module).map_err(|_| {
            Error::new(
                ErrorImpl::BackendError {
                    message: String::from("module already belongs to the execution engine"),
                },
                position.clone(),
            )
        })?;

        self.wire_intrinsics(module);
        Ok(())
    }

    /// Points every bodyless declaration whose name matches a runtime
    /// intrinsic at the Rust function's address. Must happen before the
    /// engine resolves the module's symbols.
    fn wire_intrinsics(&self, module: &Module<'ctx>) {
        for function in module.get_functions() {
            if function.count_basic_blocks() != 0 {
                continue;
            }

            if let Ok(name) = function.get_name().to_str() {
                if let Some(&address) = INTRINSICS.get(name) {
                    self.engine.add_global_mapping(&function, address);
                }
            }
        }
    }

    fn execute(&self, name: &str, position: &Position) -> Result<f64, Error> {
        unsafe {
            let function = self
                .engine
                .get_function::<unsafe extern "C" fn() -> f64>(name)
                .map_err(|error| {
                    Error::new(
                        ErrorImpl::BackendError {
                            message: error.to_string(),
                        },
                        position.clone(),
                    )
                })?;

            Ok(function.call())
        }
    }

    /// Drives units until end of input, reporting each outcome on stderr.
    /// Errors are reported and skipped; the loop only stops at `End`.
    pub fn run(&mut self) {
        loop {
            match self.run_one() {
                Ok(UnitOutcome::End) => break,
                Ok(UnitOutcome::Evaluated(value)) => eprintln!("Evaluated to {:.6}", value),
                Ok(UnitOutcome::Defined(name)) => eprintln!("Defined {}", name),
                Ok(UnitOutcome::Declared(name)) => eprintln!("Declared {}", name),
                Err(error) => report(&error),
            }
        }
    }
}

fn report(error: &Error) {
    match error.get_tip() {
        ErrorTip::None => eprintln!("Error: {}", error.get_error_name()),
        tip => eprintln!("Error: {} ({})", error.get_error_name(), tip),
    }
}

/// Ahead-of-time driver: every unit lands in one module, nothing runs.
/// Anonymous expressions still compile to their `__anon_expr` functions so
/// a wrapping `main` could call them.
pub struct AotSession<'ctx> {
    context: &'ctx Context,
    session: Session,
    parser: Parser,
    pub module: Module<'ctx>,
}

impl<'ctx> AotSession<'ctx> {
    pub fn new(
        context: &'ctx Context,
        source: Box<dyn TokenSource>,
        module_name: &str,
    ) -> Result<Self, Error> {
        Ok(AotSession {
            context,
            session: Session::new(),
            parser: Parser::new(source)?,
            module: context.create_module(module_name),
        })
    }

    pub fn run_one(&mut self) -> Result<UnitOutcome, Error> {
        let item = match parse_top_level_unit(&mut self.parser, &mut self.session) {
            Ok(Some(item)) => item,
            Ok(None) => return Ok(UnitOutcome::End),
            Err(error) => {
                self.parser.synchronize();
                return Err(error);
            }
        };

        let mut compiler = Compiler::new(self.context, &self.module);
        gen_item(&mut compiler, &mut self.session, &item)?;

        match item {
            Item::Extern(proto) => Ok(UnitOutcome::Declared(proto.name)),
            Item::Definition(definition) => Ok(UnitOutcome::Defined(definition.proto.name)),
        }
    }
}
