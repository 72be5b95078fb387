use crate::config::LoweringConfig;
use crate::decl::UnitDecl;

/// One unit of declarations together with the configuration it is lowered
/// under.
#[salsa::input(debug)]
pub struct LoweringInput {
    #[returns(ref)]
    pub unit: UnitDecl,
    #[returns(ref)]
    pub config: LoweringConfig,
}

#[derive(Default, Clone)]
#[salsa::db]
pub struct SumcDatabaseImpl {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for SumcDatabaseImpl {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::SumTypeDecl;
    use salsa::Setter;

    #[test]
    fn test_input_round_trip() {
        let mut db = SumcDatabaseImpl::default();
        let unit = UnitDecl::new("c::main").with_type(SumTypeDecl::new("Unit").variant("Unit", vec![]));
        let input = LoweringInput::new(&db, unit.clone(), LoweringConfig::default());

        assert_eq!(input.unit(&db), &unit);
        assert_eq!(input.config(&db).guard_prefix, "SUMC");

        input.set_unit(&mut db).to(UnitDecl::new("other"));
        assert_eq!(input.unit(&db).package, "other");
    }
}
