//! The Compiler structure: per-module code generation state.
//!
//! One Compiler instance generates exactly one module's worth of IR. The
//! session owns everything longer-lived (the prototype cache, the operator
//! table, the modules already handed to the execution engine).

use inkwell::{
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    passes::PassManager,
    types::BasicMetadataTypeEnum,
    values::{FunctionValue, PointerValue},
};

use crate::{ast::ast::Prototype, session::session::Session};

use super::scope::ScopeTable;

pub struct Compiler<'a, 'ctx> {
    pub context: &'ctx Context,
    pub module: &'a Module<'ctx>,
    pub builder: Builder<'ctx>,
    /// Function-level passes, run on each function right after it verifies.
    pub fpm: PassManager<FunctionValue<'ctx>>,
    /// Variable name to stack slot, for the function currently being built.
    pub variables: ScopeTable<PointerValue<'ctx>>,
}

impl<'a, 'ctx> Compiler<'a, 'ctx> {
    pub fn new(context: &'ctx Context, module: &'a Module<'ctx>) -> Self {
        let fpm = PassManager::create(module);
        fpm.add_promote_memory_to_register_pass();
        fpm.add_instruction_combining_pass();
        fpm.add_reassociate_pass();
        fpm.add_gvn_pass();
        fpm.add_cfg_simplification_pass();
        fpm.initialize();

        Compiler {
            context,
            module,
            builder: context.create_builder(),
            fpm,
            variables: ScopeTable::new(),
        }
    }

    /// Declares `proto` in this module. Every function in the language is
    /// `(f64, ...) -> f64`, so the prototype only contributes the name and
    /// the parameter count.
    pub fn declare_prototype(&self, proto: &Prototype) -> FunctionValue<'ctx> {
        let f64_type = self.context.f64_type();
        let param_types: Vec<BasicMetadataTypeEnum> =
            vec![f64_type.into(); proto.params.len()];
        let fn_type = f64_type.fn_type(&param_types, false);

        let function = self
            .module
            .add_function(&proto.name, fn_type, Some(Linkage::External));

        for (param, name) in function.get_param_iter().zip(proto.params.iter()) {
            param.set_name(name);
        }

        function
    }

    /// Resolves `name` to a function in this module, re-declaring it from
    /// the session's prototype cache when it was defined in an earlier unit.
    pub fn get_function(&self, name: &str, session: &Session) -> Option<FunctionValue<'ctx>> {
        if let Some(function) = self.module.get_function(name) {
            return Some(function);
        }

        session
            .lookup_proto(name)
            .map(|proto| self.declare_prototype(proto))
    }

    /// Creates an alloca in `function`'s entry block, in front of any code
    /// already emitted there, so mem2reg sees every slot in one place.
    pub fn create_entry_block_alloca(
        &self,
        function: FunctionValue<'ctx>,
        name: &str,
    ) -> PointerValue<'ctx> {
        let builder = self.context.create_builder();
        let entry = function.get_first_basic_block().unwrap();

        match entry.get_first_instruction() {
            Some(first) => builder.position_before(&first),
            None => builder.position_at_end(entry),
        }

        builder
            .build_alloca(self.context.f64_type(), name)
            .unwrap()
    }
}
