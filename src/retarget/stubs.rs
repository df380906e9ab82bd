//! Dummy bodies for the remaining native-interop stubs.

use log::{debug, warn};

use crate::{
    assembly::{MethodBody, MethodBodyBuilder},
    metadata::{
        signatures::{ReturnCategory, SignatureParameter},
        typesystem::TypeDef,
    },
    retarget::{StubBody, StubReport},
    Result,
};

/// Gives every stub of a type a body returning the zero value of its return type.
///
/// Out and by-ref parameters are not written.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSynthesizer;

impl StubSynthesizer {
    /// Create a synthesizer
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Implement every stub declared directly on `ty`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidBody`] if a generated body fails validation.
    pub fn synthesize(&self, ty: &mut TypeDef) -> Result<Vec<StubReport>> {
        let declaring_type = ty.full_name();
        let mut reports = Vec::new();

        for method in ty.methods.iter_mut().filter(|m| m.is_internal_call()) {
            let return_type = &method.signature.return_type;
            let category = ReturnCategory::classify(return_type);

            let (body, kind) = match category {
                ReturnCategory::Unrepresentable => {
                    warn!(
                        "{declaring_type}::{} returns {return_type}, emitting a zero-initialized local",
                        method.name
                    );
                    (zero_local_body(return_type)?, StubBody::BestEffort)
                }
                category => (zero_body(&category, return_type)?, StubBody::Zero(category)),
            };

            debug!("{declaring_type}::{} stubbed ({kind:?})", method.name);
            method.implement(body);
            reports.push(StubReport {
                declaring_type: declaring_type.clone(),
                method: method.name.clone(),
                token: method.token,
                body: kind,
            });
        }

        Ok(reports)
    }
}

/// `ldloc.0; ret` over a zero-initialized local of the exact return type.
fn zero_local_body(return_type: &SignatureParameter) -> Result<MethodBody> {
    MethodBodyBuilder::new()
        .returns_value(true)
        .init_locals(true)
        .local(return_type.full_type())
        .implementation(|asm| {
            asm.ldloc(0)?.ret()?;
            Ok(())
        })
        .build()
}

fn zero_body(category: &ReturnCategory, return_type: &SignatureParameter) -> Result<MethodBody> {
    let builder = MethodBodyBuilder::new()
        .init_locals(false)
        .returns_value(*category != ReturnCategory::Void);

    let builder = match category {
        ReturnCategory::Void => builder.implementation(|asm| {
            asm.ret()?;
            Ok(())
        }),
        ReturnCategory::DefinedValueType(_) => return zero_local_body(return_type),
        ReturnCategory::Int32 => builder.implementation(|asm| {
            asm.ldc_i4(0)?.ret()?;
            Ok(())
        }),
        ReturnCategory::Int64 => builder.implementation(|asm| {
            asm.ldc_i4(0)?.conv_i8()?.ret()?;
            Ok(())
        }),
        ReturnCategory::NativeInt => builder.implementation(|asm| {
            asm.ldc_i4(0)?.conv_i()?.ret()?;
            Ok(())
        }),
        ReturnCategory::Float32 => builder.implementation(|asm| {
            asm.ldc_r4(0.0)?.ret()?;
            Ok(())
        }),
        ReturnCategory::Float64 => builder.implementation(|asm| {
            asm.ldc_r8(0.0)?.ret()?;
            Ok(())
        }),
        ReturnCategory::Reference => builder.implementation(|asm| {
            asm.ldnull()?.ret()?;
            Ok(())
        }),
        ReturnCategory::Unrepresentable => return zero_local_body(return_type),
    };
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembly::Instruction,
        metadata::{
            signatures::{SignatureMethod, TypeSignature},
            token::Token,
            typesystem::MethodDef,
        },
    };

    const COLOR: Token = Token(0x0100_0009);

    fn stub_returning(row: u32, return_type: SignatureParameter) -> MethodDef {
        MethodDef::internal_call(
            Token::new(0x0600_0000 | row),
            format!("Native{row}"),
            SignatureMethod::instance(return_type, vec![]),
        )
    }

    fn synthesize_one(return_type: SignatureParameter) -> (MethodBody, StubReport) {
        let mut ty = TypeDef::new(Token::new(0x0200_0002), "Game", "Bindings");
        ty.methods.push(stub_returning(1, return_type));

        let mut reports = StubSynthesizer::new().synthesize(&mut ty).unwrap();
        assert_eq!(reports.len(), 1);
        let method = ty.methods.pop().unwrap();
        assert!(!method.is_internal_call());
        (method.body.unwrap(), reports.remove(0))
    }

    fn value(base: TypeSignature) -> SignatureParameter {
        SignatureParameter::value(base)
    }

    #[test]
    fn void_returns_immediately() {
        let (body, report) = synthesize_one(value(TypeSignature::Void));
        assert_eq!(body.instructions, [Instruction::Ret]);
        assert_eq!(body.max_stack, 0);
        assert_eq!(report.body, StubBody::Zero(ReturnCategory::Void));
    }

    #[test]
    fn defined_value_type_uses_initialized_local() {
        let (body, report) = synthesize_one(value(TypeSignature::ValueType(COLOR)));
        assert_eq!(body.instructions, [Instruction::Ldloc(0), Instruction::Ret]);
        assert_eq!(body.locals, [TypeSignature::ValueType(COLOR)]);
        assert!(body.init_locals);
        assert_eq!(
            report.body,
            StubBody::Zero(ReturnCategory::DefinedValueType(COLOR))
        );
    }

    #[test]
    fn small_integers_return_int32_zero() {
        for base in [
            TypeSignature::Boolean,
            TypeSignature::Char,
            TypeSignature::I1,
            TypeSignature::U1,
            TypeSignature::I2,
            TypeSignature::U2,
            TypeSignature::I4,
            TypeSignature::U4,
        ] {
            let (body, _) = synthesize_one(value(base));
            assert_eq!(body.instructions, [Instruction::LdcI4(0), Instruction::Ret]);
            assert_eq!(body.max_stack, 1);
        }
    }

    #[test]
    fn int64_converts_zero() {
        for base in [TypeSignature::I8, TypeSignature::U8] {
            let (body, _) = synthesize_one(value(base));
            assert_eq!(
                body.instructions,
                [Instruction::LdcI4(0), Instruction::ConvI8, Instruction::Ret]
            );
        }
    }

    #[test]
    fn native_int_and_pointers_convert_zero() {
        for base in [
            TypeSignature::I,
            TypeSignature::U,
            TypeSignature::Ptr(Box::new(TypeSignature::U1)),
        ] {
            let (body, report) = synthesize_one(value(base));
            assert_eq!(
                body.instructions,
                [Instruction::LdcI4(0), Instruction::ConvI, Instruction::Ret]
            );
            assert_eq!(report.body, StubBody::Zero(ReturnCategory::NativeInt));
        }
    }

    #[test]
    fn floats_return_typed_zero() {
        let (body, _) = synthesize_one(value(TypeSignature::R4));
        assert_eq!(body.instructions, [Instruction::LdcR4(0.0), Instruction::Ret]);

        let (body, _) = synthesize_one(value(TypeSignature::R8));
        assert_eq!(body.instructions, [Instruction::LdcR8(0.0), Instruction::Ret]);
    }

    #[test]
    fn references_return_null() {
        for base in [
            TypeSignature::String,
            TypeSignature::Object,
            TypeSignature::Class(Token::new(0x0100_0003)),
            TypeSignature::SzArray(Box::new(TypeSignature::I4)),
            TypeSignature::GenericInst(
                Box::new(TypeSignature::Class(Token::new(0x0100_0004))),
                vec![TypeSignature::I4],
            ),
        ] {
            let (body, report) = synthesize_one(value(base));
            assert_eq!(body.instructions, [Instruction::Ldnull, Instruction::Ret]);
            assert_eq!(report.body, StubBody::Zero(ReturnCategory::Reference));
        }
    }

    #[test]
    fn unrepresentable_gets_best_effort_local() {
        let generic = value(TypeSignature::GenericParamType(0));
        let (body, report) = synthesize_one(generic);
        assert_eq!(body.instructions, [Instruction::Ldloc(0), Instruction::Ret]);
        assert_eq!(body.locals, [TypeSignature::GenericParamType(0)]);
        assert!(body.init_locals);
        assert_eq!(report.body, StubBody::BestEffort);

        let by_ref = SignatureParameter::by_ref(TypeSignature::I4);
        let (body, report) = synthesize_one(by_ref);
        assert_eq!(
            body.locals,
            [TypeSignature::ByRef(Box::new(TypeSignature::I4))]
        );
        assert_eq!(report.body, StubBody::BestEffort);
    }

    #[test]
    fn out_parameters_are_left_untouched() {
        let mut ty = TypeDef::new(Token::new(0x0200_0002), "Game", "Bindings");
        ty.methods.push(MethodDef::internal_call(
            Token::new(0x0600_0001),
            "TryGetHit",
            SignatureMethod::instance(
                value(TypeSignature::Boolean),
                vec![SignatureParameter::by_ref(TypeSignature::ValueType(COLOR))],
            ),
        ));

        StubSynthesizer::new().synthesize(&mut ty).unwrap();
        let body = ty.methods[0].body.as_ref().unwrap();
        assert_eq!(body.instructions, [Instruction::LdcI4(0), Instruction::Ret]);
    }

    #[test]
    fn only_stubs_are_touched() {
        let existing = MethodBody {
            max_stack: 1,
            init_locals: false,
            locals: Vec::new(),
            instructions: vec![Instruction::LdcI4(7), Instruction::Ret],
        };
        let mut ty = TypeDef::new(Token::new(0x0200_0002), "Game", "Bindings");
        ty.methods.push(MethodDef::new(
            Token::new(0x0600_0001),
            "Managed",
            SignatureMethod::instance(value(TypeSignature::I4), vec![]),
            existing.clone(),
        ));
        ty.methods.push(stub_returning(2, value(TypeSignature::I4)));

        let reports = StubSynthesizer::new().synthesize(&mut ty).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].method, "Native2");
        assert_eq!(ty.methods[0].body.as_ref(), Some(&existing));
    }
}
