//! Lowering of a declaration unit to C.
//!
//! Lowering runs in two phases. Resolution walks every declaration, resolves
//! payload types against the primitive table and the other sum types of the
//! unit, instantiates generics, and allocates tags; it reports every problem
//! it finds. Only when resolution is clean does emission start: the boolean
//! shim is applied, the `core.basic_types` prelude (integer typedefs and the
//! `Bool` wrapper) is emitted, and then each sum type gets its tag constants,
//! struct, and constructors.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sumc_core::{LoweringConfig, SumTypeDecl, TypeRef, UnitDecl};
use tracing::{debug, info};

use crate::constructor::{Constructor, ConstructorEmitter};
use crate::descriptor::{LoweredType, SumTypeDescriptor, Tag, VariantDescriptor};
use crate::encoder::{EncodedRepr, VariantEncoder};
use crate::errors::{LoweringError, LoweringErrorKind, LoweringResult};
use crate::naming;
use crate::primitive::{CORE_PACKAGE, PrimitiveTable, PrimitiveType};
use crate::shim::BoolShim;
use crate::tags::TagAllocator;
use crate::unit::{CItem, CUnit};
use crate::value::{EncodedValue, Scalar};

/// Everything emitted for one sum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredSumType {
    pub descriptor: SumTypeDescriptor,
    pub repr: EncodedRepr,
    pub constructors: Vec<Constructor>,
}

impl LoweredSumType {
    pub fn constructor(&self, variant: &str) -> Option<&Constructor> {
        self.constructors.iter().find(|ctor| ctor.variant() == variant)
    }

    /// Evaluate `variant`'s constructor with `args`.
    pub fn construct(&self, variant: &str, args: Vec<Scalar>) -> LoweringResult<EncodedValue> {
        let ctor = self.constructor(variant).ok_or_else(|| {
            LoweringError::argument_mismatch(
                &self.descriptor.c_name,
                format!("no variant named `{variant}`"),
            )
        })?;
        ctor.call(args)
    }

    /// Tag-gated read of `variant`'s payload.
    pub fn payload<'v>(&self, value: &'v EncodedValue, variant: &str) -> Option<Vec<&'v Scalar>> {
        self.repr.payload(value, variant)
    }
}

/// One row of the tag table handed to dispatch code generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, salsa::Update)]
pub struct TagTableEntry {
    /// Qualified C name of the representation.
    pub ty: String,
    pub variant: String,
    /// Name of the `#define` holding the tag.
    pub constant: String,
    pub tag: Tag,
    /// Payload field names, in parameter order.
    pub fields: Vec<String>,
}

/// Result of lowering one unit.
#[derive(Debug)]
pub struct LoweredUnit {
    unit: CUnit,
    table: PrimitiveTable,
    bool_value: LoweredSumType,
    types: Vec<LoweredSumType>,
}

impl LoweredUnit {
    pub fn c_unit(&self) -> &CUnit {
        &self.unit
    }

    pub fn render(&self) -> String {
        self.unit.render()
    }

    /// The `core.basic_types.Bool` wrapper.
    pub fn bool_value(&self) -> &LoweredSumType {
        &self.bool_value
    }

    /// User sum types in emission order.
    pub fn types(&self) -> &[LoweredSumType] {
        &self.types
    }

    /// Look up a lowered type by instance name, e.g. `Option_Int32`.
    pub fn sum_type(&self, short_name: &str) -> Option<&LoweredSumType> {
        self.types
            .iter()
            .find(|ty| ty.descriptor.short_name == short_name)
    }

    pub fn tag_table(&self) -> Vec<TagTableEntry> {
        std::iter::once(&self.bool_value)
            .chain(&self.types)
            .flat_map(|ty| {
                ty.repr.variants().iter().map(|variant| TagTableEntry {
                    ty: ty.repr.c_name().to_string(),
                    variant: variant.name.clone(),
                    constant: variant.tag_constant.clone(),
                    tag: variant.tag,
                    fields: ty.repr.fields()[variant.fields.clone()]
                        .iter()
                        .map(|field| field.name.clone())
                        .collect(),
                })
            })
            .collect()
    }

    /// Render a constant as a C expression of its slot type. Booleans and
    /// sum values become constructor calls.
    pub fn render_scalar(&self, scalar: &Scalar) -> LoweringResult<String> {
        match scalar {
            Scalar::Bool(value) => {
                let variant = if *value { "True" } else { "False" };
                self.render_call(&self.bool_value, variant, &[])
            }
            Scalar::Sum(value) => self.render_value(value),
            integer => integer.int_literal(&self.table).ok_or_else(|| {
                LoweringErrorKind::UnknownPrimitive(integer.type_name()).into()
            }),
        }
    }

    /// Render a lowering-time value as the constructor call producing it.
    pub fn render_value(&self, value: &EncodedValue) -> LoweringResult<String> {
        let ty = std::iter::once(&self.bool_value)
            .chain(&self.types)
            .find(|ty| ty.repr.c_name() == value.ty())
            .ok_or_else(|| LoweringErrorKind::UnknownType(value.ty().to_string()))?;
        let layout = ty
            .repr
            .variant_of(value)
            .ok_or_else(|| LoweringErrorKind::UnknownType(value.ty().to_string()))?;
        let args = ty.repr.payload(value, &layout.name).ok_or_else(|| {
            LoweringError::argument_mismatch(
                &ty.descriptor.c_name,
                format!("value does not match the layout of `{}`", layout.name),
            )
        })?;
        let rendered: Vec<String> = args
            .into_iter()
            .map(|arg| self.render_scalar(arg))
            .collect::<LoweringResult<_>>()?;
        self.render_call(ty, &layout.name, &rendered)
    }

    fn render_call(
        &self,
        ty: &LoweredSumType,
        variant: &str,
        args: &[String],
    ) -> LoweringResult<String> {
        let ctor = ty.constructor(variant).ok_or_else(|| {
            LoweringError::argument_mismatch(&ty.descriptor.c_name, format!("no variant `{variant}`"))
        })?;
        ctor.emit_call(args)
    }
}

/// Check a unit without emitting anything. Returns every error found.
pub fn check_unit(unit: &UnitDecl, config: &LoweringConfig) -> Vec<LoweringError> {
    let (_, errors) = resolve(unit, config);
    errors
}

/// Lower a unit to C. Fails with the first error [`check_unit`] would report.
pub fn lower_unit(unit: &UnitDecl, config: &LoweringConfig) -> LoweringResult<LoweredUnit> {
    let (descriptors, errors) = resolve(unit, config);
    if let Some(err) = errors.into_iter().next() {
        return Err(err);
    }
    emit(unit, config, descriptors)
}

/// Lower a unit to C, resolving it once. Fails with every error resolution
/// found, or with the single error emission ran into.
pub fn lower_unit_checked(
    unit: &UnitDecl,
    config: &LoweringConfig,
) -> Result<LoweredUnit, Vec<LoweringError>> {
    let (descriptors, errors) = resolve(unit, config);
    if !errors.is_empty() {
        return Err(errors);
    }
    emit(unit, config, descriptors).map_err(|err| vec![err])
}

fn resolve(
    unit: &UnitDecl,
    config: &LoweringConfig,
) -> (Vec<SumTypeDescriptor>, Vec<LoweringError>) {
    let mut resolver = Resolver::new(unit, config);
    resolver.run();

    let shim = BoolShim::for_dialect(config.dialect, config.shim_guard());
    if let Err(err) = shim.check_conflicts(&unit.existing) {
        resolver.errors.push(err);
    }

    let mut names = NameTable::default();
    names.claim_prelude(&shim);
    match bool_descriptor() {
        Ok(descriptor) => names.claim_sum_type(&descriptor, &config.constructor_prefix),
        Err(err) => resolver.errors.push(err),
    }
    for descriptor in &resolver.descriptors {
        names.claim_sum_type(descriptor, &config.constructor_prefix);
    }
    resolver.errors.extend(names.errors);

    (resolver.descriptors, resolver.errors)
}

/// File-scope names the emitted unit declares, each with what declares it.
/// Types, functions and macros share one namespace here.
#[derive(Default)]
struct NameTable {
    owners: HashMap<String, String>,
    errors: Vec<LoweringError>,
}

impl NameTable {
    fn claim(&mut self, ty: &str, name: String, owner: String) {
        match self.owners.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(owner);
            }
            Entry::Occupied(entry) => {
                self.errors.push(
                    LoweringErrorKind::NameCollision {
                        ty: ty.to_string(),
                        name: entry.key().clone(),
                        owner,
                        other: entry.get().clone(),
                    }
                    .into(),
                );
            }
        }
    }

    fn claim_prelude(&mut self, shim: &BoolShim) {
        let shim_names = [shim.guard(), "__bool_true_false_are_defined", "bool", "true", "false"];
        for name in shim_names {
            self.claim(name, name.to_string(), "the boolean shim".to_string());
        }
        for ty in PrimitiveType::ALL.into_iter().filter(|ty| ty.is_integer()) {
            self.claim(ty.name(), ty.c_name(), format!("primitive `{}`", ty.name()));
        }
    }

    fn claim_sum_type(&mut self, descriptor: &SumTypeDescriptor, prefix: &str) {
        let ty = descriptor.short_name.as_str();
        let label = if descriptor.source_name == descriptor.short_name {
            format!("type `{ty}`")
        } else {
            format!("instance `{ty}` of `{}`", descriptor.source_name)
        };
        self.claim(ty, descriptor.c_name.clone(), label);
        for variant in &descriptor.variants {
            self.claim(
                ty,
                naming::tag_constant(&descriptor.c_name, &variant.name),
                format!("tag constant of `{ty}::{}`", variant.name),
            );
            self.claim(
                ty,
                naming::constructor(prefix, &descriptor.c_name, &variant.name),
                format!("constructor of `{ty}::{}`", variant.name),
            );
        }
    }
}

fn emit(
    decls: &UnitDecl,
    config: &LoweringConfig,
    descriptors: Vec<SumTypeDescriptor>,
) -> LoweringResult<LoweredUnit> {
    let table = PrimitiveTable::new(config.dialect, config.data_model);
    let encoder = VariantEncoder;
    let emitter = ConstructorEmitter::new(config.constructor_prefix.clone());

    let mut unit =
        CUnit::new(config.dialect, config.shim_guard()).with_existing(decls.existing.clone());
    unit.apply_bool_shim()?;

    if table.needs_stdint() {
        unit.push(CItem::SystemInclude("stdint.h".to_string()));
    }
    unit.extend(decls.includes.iter().cloned().map(CItem::Include));

    unit.extend(
        table
            .typedefs()
            .into_iter()
            .map(|(name, target)| CItem::Typedef { name, target }),
    );
    let bool_value = lower_sum_type(&mut unit, bool_descriptor()?, &encoder, &emitter)?;

    let types = descriptors
        .into_iter()
        .map(|descriptor| lower_sum_type(&mut unit, descriptor, &encoder, &emitter))
        .collect::<LoweringResult<Vec<_>>>()?;

    info!(
        package = %decls.package,
        types = types.len(),
        dialect = %config.dialect,
        "lowered unit"
    );

    Ok(LoweredUnit {
        unit,
        table,
        bool_value,
        types,
    })
}

fn lower_sum_type(
    unit: &mut CUnit,
    descriptor: SumTypeDescriptor,
    encoder: &VariantEncoder,
    emitter: &ConstructorEmitter,
) -> LoweringResult<LoweredSumType> {
    let repr = encoder.encode(&descriptor)?;
    let constructors = emitter.emit(&repr);

    let dialect = unit.dialect();
    unit.extend(repr.tag_defines());
    unit.push(CItem::Struct(repr.c_struct()));
    unit.extend(
        constructors
            .iter()
            .map(|ctor| CItem::Function(ctor.c_function(dialect))),
    );

    Ok(LoweredSumType {
        descriptor,
        repr,
        constructors,
    })
}

/// `core.basic_types.Bool = False | True`
fn bool_descriptor() -> LoweringResult<SumTypeDescriptor> {
    let variants = ["False", "True"];
    let assignment = TagAllocator.assign(PrimitiveType::Bool.name(), &variants)?;
    Ok(SumTypeDescriptor {
        source_name: PrimitiveType::Bool.name().to_string(),
        short_name: PrimitiveType::Bool.name().to_string(),
        c_name: naming::qualified(CORE_PACKAGE, PrimitiveType::Bool.name()),
        tag_repr: assignment.repr,
        variants: variants
            .iter()
            .zip(assignment.tags)
            .map(|(name, tag)| VariantDescriptor {
                name: name.to_string(),
                tag,
                payload: Vec::new(),
            })
            .collect(),
    })
}

/// Generic parameter bindings of the declaration being resolved.
type Bindings = Vec<(String, LoweredType)>;

/// A declaration together with its type arguments.
type InstanceKey = (String, Vec<LoweredType>);

struct Resolver<'a> {
    unit: &'a UnitDecl,
    table: PrimitiveTable,
    descriptors: Vec<SumTypeDescriptor>,
    resolved: HashMap<InstanceKey, LoweredType>,
    in_progress: HashSet<InstanceKey>,
    failed: HashSet<InstanceKey>,
    errors: Vec<LoweringError>,
}

impl<'a> Resolver<'a> {
    fn new(unit: &'a UnitDecl, config: &LoweringConfig) -> Self {
        Self {
            unit,
            table: PrimitiveTable::new(config.dialect, config.data_model),
            descriptors: Vec::new(),
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
            failed: HashSet::new(),
            errors: Vec::new(),
        }
    }

    fn error(&mut self, err: impl Into<LoweringError>) {
        self.errors.push(err.into());
    }

    fn run(&mut self) {
        let unit = self.unit;
        let mut seen = HashSet::new();
        for decl in &unit.types {
            if !seen.insert(decl.name.as_str()) {
                self.error(LoweringErrorKind::DuplicateTypeName(decl.name.clone()));
            }
        }

        for decl in &unit.types {
            if decl.is_generic() {
                debug!(ty = %decl.name, "generic type awaits instantiation");
                continue;
            }
            self.require(decl, Vec::new());
        }

        for instance in &unit.instances {
            let Some(decl) = unit.find_type(&instance.ty) else {
                self.error(LoweringErrorKind::UnknownType(instance.ty.clone()));
                continue;
            };
            if !decl.is_generic() {
                self.error(LoweringErrorKind::NotGeneric(decl.name.clone()));
                continue;
            }
            if let Some(args) = self.resolve_args(&decl.name, &instance.args, &Vec::new()) {
                self.require(decl, args);
            }
        }
    }

    /// Resolve (and lower, if not done yet) `decl` instantiated with `args`.
    fn require(&mut self, decl: &'a SumTypeDecl, args: Vec<LoweredType>) -> Option<LoweredType> {
        if decl.generics.len() != args.len() {
            self.error(LoweringErrorKind::GenericArity {
                ty: decl.name.clone(),
                expected: decl.generics.len(),
                found: args.len(),
            });
            return None;
        }

        let arg_names: Vec<&str> = args.iter().map(LoweredType::short_name).collect();
        let short_name = naming::instance_name(&decl.name, &arg_names);
        let key: InstanceKey = (decl.name.clone(), args.clone());
        if let Some(ty) = self.resolved.get(&key) {
            return Some(ty.clone());
        }
        if self.failed.contains(&key) {
            return None;
        }
        if !self.in_progress.insert(key.clone()) {
            self.error(LoweringErrorKind::RecursiveType(short_name));
            return None;
        }

        let bindings: Bindings = decl.generics.iter().cloned().zip(args).collect();
        let descriptor = self.resolve_decl(decl, &short_name, &bindings);
        self.in_progress.remove(&key);

        match descriptor {
            Some(descriptor) => {
                let ty = descriptor.as_type();
                debug!(ty = %descriptor.c_name, variants = descriptor.variants.len(), "resolved sum type");
                self.resolved.insert(key, ty.clone());
                self.descriptors.push(descriptor);
                Some(ty)
            }
            None => {
                self.failed.insert(key);
                None
            }
        }
    }

    fn resolve_decl(
        &mut self,
        decl: &'a SumTypeDecl,
        short_name: &str,
        bindings: &Bindings,
    ) -> Option<SumTypeDescriptor> {
        let mut ok = true;

        for name in std::iter::once(&decl.name).chain(&decl.generics) {
            if !naming::is_valid_identifier(name) {
                self.error(LoweringErrorKind::InvalidIdentifier(name.clone()));
                ok = false;
            }
        }
        if decl.variants.is_empty() {
            self.error(LoweringErrorKind::EmptySumType(decl.name.clone()));
            return None;
        }

        let mut payloads = Vec::with_capacity(decl.variants.len());
        for variant in &decl.variants {
            if !naming::is_valid_identifier(&variant.name) {
                self.error(LoweringErrorKind::InvalidIdentifier(variant.name.clone()));
                ok = false;
            }
            let mut payload = Vec::with_capacity(variant.payload.len());
            for ty in &variant.payload {
                match self.resolve_ref(&decl.name, ty, bindings) {
                    Some(ty) => payload.push(ty),
                    None => ok = false,
                }
            }
            payloads.push(payload);
        }

        let names: Vec<&str> = decl.variants.iter().map(|v| v.name.as_str()).collect();
        let assignment = match TagAllocator.assign(&decl.name, &names) {
            Ok(assignment) => assignment,
            Err(err) => {
                self.error(err);
                return None;
            }
        };
        if !ok {
            return None;
        }

        Some(SumTypeDescriptor {
            source_name: decl.name.clone(),
            short_name: short_name.to_string(),
            c_name: naming::qualified(&self.unit.package, short_name),
            tag_repr: assignment.repr,
            variants: decl
                .variants
                .iter()
                .zip(assignment.tags)
                .zip(payloads)
                .map(|((variant, tag), payload)| VariantDescriptor {
                    name: variant.name.clone(),
                    tag,
                    payload,
                })
                .collect(),
        })
    }

    fn resolve_ref(&mut self, owner: &str, ty: &TypeRef, bindings: &Bindings) -> Option<LoweredType> {
        match ty {
            TypeRef::Primitive(name) => match self.table.lookup(name) {
                Ok(prim) => Some(LoweredType::Primitive(prim)),
                Err(err) => {
                    self.error(err);
                    None
                }
            },
            TypeRef::Generic(param) => {
                let bound = bindings
                    .iter()
                    .find(|(name, _)| name == param)
                    .map(|(_, ty)| ty.clone());
                if bound.is_none() {
                    self.error(LoweringErrorKind::UnboundGeneric {
                        ty: owner.to_string(),
                        param: param.clone(),
                    });
                }
                bound
            }
            TypeRef::Sum { name, args } => {
                let unit = self.unit;
                let Some(decl) = unit.find_type(name) else {
                    self.error(LoweringErrorKind::UnknownType(name.clone()));
                    return None;
                };
                if decl.is_generic() && args.is_empty() {
                    self.error(LoweringErrorKind::UninstantiatedGeneric(name.clone()));
                    return None;
                }
                if !decl.is_generic() && !args.is_empty() {
                    self.error(LoweringErrorKind::NotGeneric(name.clone()));
                    return None;
                }
                let args = self.resolve_args(owner, args, bindings)?;
                self.require(decl, args)
            }
        }
    }

    /// Resolve generic arguments. Arguments must be primitives or
    /// non-generic sum types: instances never nest.
    fn resolve_args(
        &mut self,
        owner: &str,
        args: &[TypeRef],
        bindings: &Bindings,
    ) -> Option<Vec<LoweredType>> {
        let mut resolved = Vec::with_capacity(args.len());
        let mut ok = true;
        for arg in args {
            if let TypeRef::Sum { name, args } = arg
                && !args.is_empty()
            {
                self.error(LoweringErrorKind::UnsupportedNestedGeneric {
                    ty: owner.to_string(),
                    arg: name.clone(),
                });
                ok = false;
                continue;
            }
            match self.resolve_ref(owner, arg, bindings) {
                Some(ty) => resolved.push(ty),
                None => ok = false,
            }
        }
        ok.then_some(resolved)
    }
}
