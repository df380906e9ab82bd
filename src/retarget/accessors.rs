//! Accessor pair synthesis for native-interop stubs.
//!
//! A getter stub (`GetX`/`get_X`) and a setter stub (`SetX`/`set_X`) of the same type that agree
//! on the value type and on staticness are turned into a plain auto-property: a private backing
//! field `<X>k__BackingField` is added and both methods get a body that reads or writes it.
//!
//! Two getter shapes are recognized:
//!
//! | Shape | Getter | Setter |
//! |---|---|---|
//! | value-returning | `T GetX()` | `void SetX(T)` |
//! | out-parameter | `void GetX(out T)` | `void SetX(T)` |
//!
//! The out-parameter form copies a defined type with `cpobj` on its type token, and a primitive,
//! `string` or `object` with the matching `ldind`/`stind`. A pair whose value type is neither,
//! such as a generic parameter, is logged and left alone; both methods then fall through to
//! [`crate::retarget::StubSynthesizer`].

use log::{debug, error};

use crate::{
    assembly::{IndirectKind, MethodBody, MethodBodyBuilder},
    metadata::{
        module::TokenAllocator,
        signatures::TypeSignature,
        token::{TableId, Token},
        typesystem::{FieldAttributes, FieldDef, MethodDef, TypeDef},
    },
    retarget::{AccessorReport, AccessorShape},
    Result,
};

const ACCESSOR_PREFIX_LEN: usize = 3;

/// A getter and setter that belong together, by method index.
struct AccessorPair {
    getter: usize,
    setter: usize,
    value_type: TypeSignature,
    shape: AccessorShape,
    is_static: bool,
}

/// How an out-parameter accessor moves its value between the field and the caller.
#[derive(Debug, Clone, Copy)]
enum OutCopy {
    /// `cpobj` on a defined type
    Object(Token),
    /// Typed indirect load and store
    Indirect(IndirectKind),
}

impl OutCopy {
    fn of(value_type: &TypeSignature) -> Option<Self> {
        value_type
            .defined_type_token()
            .map(OutCopy::Object)
            .or_else(|| IndirectKind::of(value_type).map(OutCopy::Indirect))
    }
}

/// Detects getter/setter stub pairs and gives them a backing field.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessorSynthesizer;

impl AccessorSynthesizer {
    /// Create a synthesizer
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Synthesize every accessor pair declared directly on `ty`.
    ///
    /// New fields take their tokens from `allocator`. Nested types are not visited.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidBody`] if a generated body fails validation.
    pub fn synthesize(
        &self,
        ty: &mut TypeDef,
        allocator: &mut TokenAllocator,
    ) -> Result<Vec<AccessorReport>> {
        let pairs = find_pairs(&ty.methods);
        let declaring_type = ty.full_name();
        let mut reports = Vec::with_capacity(pairs.len());

        for pair in pairs {
            let out_copy = match pair.shape {
                AccessorShape::ValueReturning => None,
                AccessorShape::OutParameter => match OutCopy::of(&pair.value_type) {
                    Some(copy) => Some(copy),
                    None => {
                        error!(
                            "Cannot synthesize {declaring_type}::{}/{}: out value type {} cannot be copied",
                            ty.methods[pair.getter].name,
                            ty.methods[pair.setter].name,
                            pair.value_type
                        );
                        continue;
                    }
                },
            };

            let field_name = unique_field_name(ty, &backing_field_name(&ty.methods[pair.getter]));
            let field_token = allocator.next_token(TableId::Field);

            let (getter_body, setter_body) = match out_copy {
                None => value_bodies(field_token, pair.is_static)?,
                Some(copy) => out_bodies(field_token, copy, pair.is_static)?,
            };

            let mut flags = FieldAttributes::PRIVATE;
            if pair.is_static {
                flags |= FieldAttributes::STATIC;
            }
            ty.fields.push(FieldDef {
                token: field_token,
                name: field_name.clone(),
                flags,
                signature: pair.value_type,
            });

            ty.methods[pair.getter].implement(getter_body);
            ty.methods[pair.setter].implement(setter_body);

            let report = AccessorReport {
                declaring_type: declaring_type.clone(),
                getter: ty.methods[pair.getter].name.clone(),
                setter: ty.methods[pair.setter].name.clone(),
                field: field_name,
                field_token,
                shape: pair.shape,
                is_static: pair.is_static,
            };
            debug!(
                "{}::{}/{} backed by {}",
                report.declaring_type, report.getter, report.setter, report.field
            );
            reports.push(report);
        }

        Ok(reports)
    }
}

fn has_prefix(name: &str, upper: &str, lower: &str) -> bool {
    name.starts_with(upper) || name.starts_with(lower)
}

fn is_setter_candidate(method: &MethodDef) -> bool {
    method.is_internal_call()
        && has_prefix(&method.name, "Set", "set")
        && method.signature.params.len() == 1
        && !method.signature.returns_value()
}

/// Getter shape and value type, if `method` is a getter stub.
fn getter_shape(method: &MethodDef) -> Option<(AccessorShape, TypeSignature)> {
    if !method.is_internal_call() || !has_prefix(&method.name, "Get", "get") {
        return None;
    }

    let signature = &method.signature;
    match signature.params.as_slice() {
        [] if signature.returns_value() && !signature.return_type.by_ref => Some((
            AccessorShape::ValueReturning,
            signature.return_type.full_type(),
        )),
        [out] if !signature.returns_value() => out
            .dereferenced()
            .map(|value_type| (AccessorShape::OutParameter, value_type.clone())),
        _ => None,
    }
}

/// `GetX` pairs with `SetX`, `get_X` with `set_X`.
fn setter_name(getter: &str) -> String {
    let mut chars = getter.chars();
    match chars.next() {
        Some('G') => format!("S{}", chars.as_str()),
        Some('g') => format!("s{}", chars.as_str()),
        _ => getter.to_string(),
    }
}

fn find_pairs(methods: &[MethodDef]) -> Vec<AccessorPair> {
    let mut candidates: Vec<usize> = methods
        .iter()
        .enumerate()
        .filter(|(_, m)| is_setter_candidate(m))
        .map(|(index, _)| index)
        .collect();

    let mut pairs = Vec::new();
    for (getter_index, getter) in methods.iter().enumerate() {
        let Some((shape, value_type)) = getter_shape(getter) else {
            continue;
        };
        let wanted = setter_name(&getter.name);

        let matched = candidates.iter().position(|&index| {
            let setter = &methods[index];
            setter.name == wanted
                && setter.is_static() == getter.is_static()
                && setter.signature.params[0].full_type() == value_type
        });

        if let Some(position) = matched {
            pairs.push(AccessorPair {
                getter: getter_index,
                setter: candidates.remove(position),
                value_type,
                shape,
                is_static: getter.is_static(),
            });
        }
    }
    pairs
}

/// `get_Flag` and `GetFlag` both back onto `<Flag>k__BackingField`.
fn backing_field_name(getter: &MethodDef) -> String {
    let property = getter.name.get(ACCESSOR_PREFIX_LEN..).unwrap_or_default();
    let property = property.strip_prefix('_').unwrap_or(property);
    format!("<{property}>k__BackingField")
}

fn unique_field_name(ty: &TypeDef, base: &str) -> String {
    if ty.field(base).is_none() {
        return base.to_string();
    }
    (0u32..)
        .map(|suffix| format!("{base}{suffix}"))
        .find(|candidate| ty.field(candidate).is_none())
        .unwrap_or_else(|| base.to_string())
}

fn value_bodies(field: Token, is_static: bool) -> Result<(MethodBody, MethodBody)> {
    let getter = MethodBodyBuilder::new()
        .init_locals(false)
        .returns_value(true)
        .implementation(move |asm| {
            if is_static {
                asm.ldsfld(field)?.ret()?;
            } else {
                asm.ldarg_0()?.ldfld(field)?.ret()?;
            }
            Ok(())
        })
        .build()?;

    let setter = MethodBodyBuilder::new()
        .init_locals(false)
        .implementation(move |asm| {
            if is_static {
                asm.ldarg_0()?.stsfld(field)?.ret()?;
            } else {
                asm.ldarg_0()?.ldarg(1)?.stfld(field)?.ret()?;
            }
            Ok(())
        })
        .build()?;

    Ok((getter, setter))
}

fn out_bodies(field: Token, copy: OutCopy, is_static: bool) -> Result<(MethodBody, MethodBody)> {
    let getter = MethodBodyBuilder::new()
        .init_locals(false)
        .implementation(move |asm| {
            match (copy, is_static) {
                (OutCopy::Object(value_type), true) => {
                    asm.ldarg_0()?.ldsflda(field)?.cpobj(value_type)?.ret()?
                }
                (OutCopy::Object(value_type), false) => asm
                    .ldarg(1)?
                    .ldarg_0()?
                    .ldflda(field)?
                    .cpobj(value_type)?
                    .ret()?,
                (OutCopy::Indirect(kind), true) => {
                    asm.ldarg_0()?.ldsfld(field)?.stind(kind)?.ret()?
                }
                (OutCopy::Indirect(kind), false) => asm
                    .ldarg(1)?
                    .ldarg_0()?
                    .ldfld(field)?
                    .stind(kind)?
                    .ret()?,
            };
            Ok(())
        })
        .build()?;

    let setter = MethodBodyBuilder::new()
        .init_locals(false)
        .implementation(move |asm| {
            match (copy, is_static) {
                (OutCopy::Object(value_type), true) => {
                    asm.ldsflda(field)?.ldarga(0)?.cpobj(value_type)?.ret()?
                }
                (OutCopy::Object(value_type), false) => asm
                    .ldarg_0()?
                    .ldflda(field)?
                    .ldarga(1)?
                    .cpobj(value_type)?
                    .ret()?,
                (OutCopy::Indirect(kind), true) => {
                    asm.ldarga(0)?.ldind(kind)?.stsfld(field)?.ret()?
                }
                (OutCopy::Indirect(kind), false) => asm
                    .ldarg_0()?
                    .ldarga(1)?
                    .ldind(kind)?
                    .stfld(field)?
                    .ret()?,
            };
            Ok(())
        })
        .build()?;

    Ok((getter, setter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembly::Instruction,
        metadata::signatures::{SignatureMethod, SignatureParameter},
        retarget::StubSynthesizer,
    };

    const VECTOR3: Token = Token(0x0100_0005);

    fn instance(ret: TypeSignature, params: Vec<SignatureParameter>) -> SignatureMethod {
        SignatureMethod::instance(SignatureParameter::value(ret), params)
    }

    fn stub(row: u32, name: &str, signature: SignatureMethod) -> MethodDef {
        MethodDef::internal_call(Token::from_parts(TableId::MethodDef, row), name, signature)
    }

    fn getter(row: u32, name: &str, ret: TypeSignature) -> MethodDef {
        stub(row, name, instance(ret, vec![]))
    }

    fn setter(row: u32, name: &str, param: TypeSignature) -> MethodDef {
        stub(
            row,
            name,
            instance(TypeSignature::Void, vec![SignatureParameter::value(param)]),
        )
    }

    fn out_getter(row: u32, name: &str, value: TypeSignature) -> MethodDef {
        stub(
            row,
            name,
            instance(TypeSignature::Void, vec![SignatureParameter::by_ref(value)]),
        )
    }

    fn component(methods: Vec<MethodDef>) -> TypeDef {
        let mut ty = TypeDef::new(Token::new(0x0200_0002), "Game", "Component");
        ty.methods = methods;
        ty
    }

    fn instructions(method: &MethodDef) -> &[Instruction] {
        &method.body.as_ref().unwrap().instructions
    }

    #[test]
    fn value_pair_getter_first() {
        let mut ty = component(vec![
            getter(1, "get_Flag", TypeSignature::Boolean),
            setter(2, "set_Flag", TypeSignature::Boolean),
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert_eq!(reports.len(), 1);
        let field = ty.field("<Flag>k__BackingField").unwrap();
        assert_eq!(field.flags, FieldAttributes::PRIVATE);
        assert_eq!(field.signature, TypeSignature::Boolean);
        assert_eq!(field.token, Token::new(0x0400_0001));
        assert_eq!(reports[0].field_token, field.token);
        assert_eq!(reports[0].shape, AccessorShape::ValueReturning);

        let f = field.token;
        assert_eq!(
            instructions(&ty.methods[0]),
            &[Instruction::Ldarg(0), Instruction::Ldfld(f), Instruction::Ret]
        );
        assert_eq!(
            instructions(&ty.methods[1]),
            &[
                Instruction::Ldarg(0),
                Instruction::Ldarg(1),
                Instruction::Stfld(f),
                Instruction::Ret
            ]
        );
        assert!(ty.methods.iter().all(|m| !m.is_internal_call()));
    }

    #[test]
    fn value_pair_setter_first() {
        let mut ty = component(vec![
            setter(1, "SetHealth", TypeSignature::R4),
            getter(2, "GetHealth", TypeSignature::R4),
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].getter, "GetHealth");
        assert_eq!(reports[0].setter, "SetHealth");
        assert_eq!(reports[0].field, "<Health>k__BackingField");
        assert!(ty.methods.iter().all(|m| m.body.is_some()));
    }

    #[test]
    fn backing_field_collisions_get_suffixes() {
        let mut ty = component(vec![
            getter(1, "get_Flag", TypeSignature::Boolean),
            setter(2, "set_Flag", TypeSignature::Boolean),
            getter(3, "GetFlag", TypeSignature::Boolean),
            setter(4, "SetFlag", TypeSignature::Boolean),
        ]);
        ty.fields.push(FieldDef {
            token: Token::new(0x0400_0001),
            name: "<Flag>k__BackingField".to_string(),
            flags: FieldAttributes::PRIVATE,
            signature: TypeSignature::Boolean,
        });
        let mut allocator = TokenAllocator::default();
        allocator.reserve(TableId::Field, Token::new(0x0400_0001));

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        let names: Vec<&str> = reports.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(names, ["<Flag>k__BackingField0", "<Flag>k__BackingField1"]);
        assert_eq!(ty.fields.len(), 3);
        assert_eq!(reports[0].field_token, Token::new(0x0400_0002));
        assert_eq!(reports[1].field_token, Token::new(0x0400_0003));
    }

    #[test]
    fn out_parameter_pair() {
        let mut ty = component(vec![
            stub(
                1,
                "GetPosition",
                instance(
                    TypeSignature::Void,
                    vec![SignatureParameter::by_ref(TypeSignature::ValueType(VECTOR3))],
                ),
            ),
            setter(2, "SetPosition", TypeSignature::ValueType(VECTOR3)),
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].shape, AccessorShape::OutParameter);
        let field = ty.field("<Position>k__BackingField").unwrap();
        assert_eq!(field.signature, TypeSignature::ValueType(VECTOR3));

        let f = field.token;
        assert_eq!(
            instructions(&ty.methods[0]),
            &[
                Instruction::Ldarg(1),
                Instruction::Ldarg(0),
                Instruction::Ldflda(f),
                Instruction::Cpobj(VECTOR3),
                Instruction::Ret
            ]
        );
        assert_eq!(
            instructions(&ty.methods[1]),
            &[
                Instruction::Ldarg(0),
                Instruction::Ldflda(f),
                Instruction::Ldarga(1),
                Instruction::Cpobj(VECTOR3),
                Instruction::Ret
            ]
        );
    }

    #[test]
    fn out_parameter_primitive_pair() {
        let mut ty = component(vec![
            out_getter(1, "GetSpeed", TypeSignature::R4),
            setter(2, "SetSpeed", TypeSignature::R4),
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].shape, AccessorShape::OutParameter);
        let field = ty.field("<Speed>k__BackingField").unwrap();
        assert_eq!(field.signature, TypeSignature::R4);

        let f = field.token;
        assert_eq!(
            instructions(&ty.methods[0]),
            &[
                Instruction::Ldarg(1),
                Instruction::Ldarg(0),
                Instruction::Ldfld(f),
                Instruction::Stind(IndirectKind::R4),
                Instruction::Ret
            ]
        );
        assert_eq!(
            instructions(&ty.methods[1]),
            &[
                Instruction::Ldarg(0),
                Instruction::Ldarga(1),
                Instruction::Ldind(IndirectKind::R4),
                Instruction::Stfld(f),
                Instruction::Ret
            ]
        );
    }

    #[test]
    fn out_parameter_pair_for_every_primitive_family() {
        let families = [
            (TypeSignature::Boolean, IndirectKind::U1),
            (TypeSignature::I1, IndirectKind::I1),
            (TypeSignature::U1, IndirectKind::U1),
            (TypeSignature::Char, IndirectKind::U2),
            (TypeSignature::I2, IndirectKind::I2),
            (TypeSignature::U2, IndirectKind::U2),
            (TypeSignature::I4, IndirectKind::I4),
            (TypeSignature::U4, IndirectKind::U4),
            (TypeSignature::I8, IndirectKind::I8),
            (TypeSignature::U8, IndirectKind::I8),
            (TypeSignature::R4, IndirectKind::R4),
            (TypeSignature::R8, IndirectKind::R8),
            (TypeSignature::I, IndirectKind::I),
            (TypeSignature::U, IndirectKind::I),
            (TypeSignature::String, IndirectKind::Ref),
            (TypeSignature::Object, IndirectKind::Ref),
        ];

        for (value_type, kind) in families {
            let mut ty = component(vec![
                out_getter(1, "GetValue", value_type.clone()),
                setter(2, "SetValue", value_type.clone()),
            ]);
            let mut allocator = TokenAllocator::default();

            let reports = AccessorSynthesizer::new()
                .synthesize(&mut ty, &mut allocator)
                .unwrap();

            assert_eq!(reports.len(), 1, "{value_type} was not paired");
            assert_eq!(ty.fields[0].signature, value_type);
            assert_eq!(
                instructions(&ty.methods[0])[3],
                Instruction::Stind(kind),
                "{value_type}"
            );
            assert_eq!(
                instructions(&ty.methods[1])[2],
                Instruction::Ldind(kind),
                "{value_type}"
            );
        }
    }

    #[test]
    fn static_out_parameter_primitive_pair() {
        let mut ty = component(vec![
            stub(
                1,
                "GetTimeScale",
                SignatureMethod::static_method(
                    SignatureParameter::value(TypeSignature::Void),
                    vec![SignatureParameter::by_ref(TypeSignature::R8)],
                ),
            ),
            stub(
                2,
                "SetTimeScale",
                SignatureMethod::static_method(
                    SignatureParameter::value(TypeSignature::Void),
                    vec![SignatureParameter::value(TypeSignature::R8)],
                ),
            ),
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert!(ty.fields[0].is_static());
        let f = ty.fields[0].token;
        assert_eq!(
            instructions(&ty.methods[0]),
            &[
                Instruction::Ldarg(0),
                Instruction::Ldsfld(f),
                Instruction::Stind(IndirectKind::R8),
                Instruction::Ret
            ]
        );
        assert_eq!(
            instructions(&ty.methods[1]),
            &[
                Instruction::Ldarga(0),
                Instruction::Ldind(IndirectKind::R8),
                Instruction::Stsfld(f),
                Instruction::Ret
            ]
        );
    }

    #[test]
    fn static_pairs() {
        let static_getter = stub(
            1,
            "get_Enabled",
            SignatureMethod::static_method(SignatureParameter::value(TypeSignature::Boolean), vec![]),
        );
        let static_setter = stub(
            2,
            "set_Enabled",
            SignatureMethod::static_method(
                SignatureParameter::value(TypeSignature::Void),
                vec![SignatureParameter::value(TypeSignature::Boolean)],
            ),
        );
        let static_out_getter = stub(
            3,
            "GetGravity",
            SignatureMethod::static_method(
                SignatureParameter::value(TypeSignature::Void),
                vec![SignatureParameter::by_ref(TypeSignature::ValueType(VECTOR3))],
            ),
        );
        let static_out_setter = stub(
            4,
            "SetGravity",
            SignatureMethod::static_method(
                SignatureParameter::value(TypeSignature::Void),
                vec![SignatureParameter::value(TypeSignature::ValueType(VECTOR3))],
            ),
        );
        let mut ty = component(vec![
            static_getter,
            static_setter,
            static_out_getter,
            static_out_setter,
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.is_static));
        assert!(ty.fields.iter().all(FieldDef::is_static));

        let enabled = ty.field("<Enabled>k__BackingField").unwrap().token;
        let gravity = ty.field("<Gravity>k__BackingField").unwrap().token;
        assert_eq!(
            instructions(&ty.methods[0]),
            &[Instruction::Ldsfld(enabled), Instruction::Ret]
        );
        assert_eq!(
            instructions(&ty.methods[1]),
            &[Instruction::Ldarg(0), Instruction::Stsfld(enabled), Instruction::Ret]
        );
        assert_eq!(
            instructions(&ty.methods[2]),
            &[
                Instruction::Ldarg(0),
                Instruction::Ldsflda(gravity),
                Instruction::Cpobj(VECTOR3),
                Instruction::Ret
            ]
        );
        assert_eq!(
            instructions(&ty.methods[3]),
            &[
                Instruction::Ldsflda(gravity),
                Instruction::Ldarga(0),
                Instruction::Cpobj(VECTOR3),
                Instruction::Ret
            ]
        );
    }

    #[test]
    fn unresolvable_out_type_is_abandoned() {
        let mut ty = component(vec![
            stub(
                1,
                "GetItem",
                instance(
                    TypeSignature::Void,
                    vec![SignatureParameter::by_ref(TypeSignature::GenericParamType(0))],
                ),
            ),
            setter(2, "SetItem", TypeSignature::GenericParamType(0)),
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert!(reports.is_empty());
        assert!(ty.fields.is_empty());
        assert!(ty.methods.iter().all(MethodDef::is_internal_call));
        assert_eq!(allocator.next_token(TableId::Field), Token::new(0x0400_0001));

        let stubs = StubSynthesizer::new().synthesize(&mut ty).unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(instructions(&ty.methods[0]), &[Instruction::Ret]);
        assert_eq!(instructions(&ty.methods[1]), &[Instruction::Ret]);
    }

    #[test]
    fn mismatched_candidates_are_not_paired() {
        let static_setter = stub(
            3,
            "set_Speed",
            SignatureMethod::static_method(
                SignatureParameter::value(TypeSignature::Void),
                vec![SignatureParameter::value(TypeSignature::R4)],
            ),
        );
        let returning_setter = stub(
            5,
            "set_Name",
            instance(
                TypeSignature::Boolean,
                vec![SignatureParameter::value(TypeSignature::String)],
            ),
        );
        let mut ty = component(vec![
            getter(1, "get_Count", TypeSignature::I4),
            setter(2, "set_Count", TypeSignature::I8),
            getter(4, "get_Speed", TypeSignature::R4),
            static_setter,
            getter(6, "get_Name", TypeSignature::String),
            returning_setter,
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert!(reports.is_empty());
        assert!(ty.methods.iter().all(MethodDef::is_internal_call));
    }

    #[test]
    fn first_matching_setter_wins() {
        let mut ty = component(vec![
            setter(1, "set_Value", TypeSignature::String),
            setter(2, "set_Value", TypeSignature::I4),
            setter(3, "set_Value", TypeSignature::I4),
            getter(4, "get_Value", TypeSignature::I4),
        ]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert!(ty.methods[0].is_internal_call());
        assert!(!ty.methods[1].is_internal_call());
        assert!(ty.methods[2].is_internal_call());
        assert!(!ty.methods[3].is_internal_call());
    }

    #[test]
    fn implemented_methods_are_ignored() {
        let mut implemented = getter(1, "get_Flag", TypeSignature::Boolean);
        implemented.implement(MethodBody {
            max_stack: 1,
            init_locals: false,
            locals: Vec::new(),
            instructions: vec![Instruction::LdcI4(1), Instruction::Ret],
        });
        let mut ty = component(vec![implemented, setter(2, "set_Flag", TypeSignature::Boolean)]);
        let mut allocator = TokenAllocator::default();

        let reports = AccessorSynthesizer::new()
            .synthesize(&mut ty, &mut allocator)
            .unwrap();

        assert!(reports.is_empty());
        assert!(ty.methods[1].is_internal_call());
    }
}
