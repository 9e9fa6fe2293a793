use postgres::{
    types::{accepts, private::BytesMut, to_sql_checked, IsNull, ToSql, Type},
    Row,
};
use strata_core::{
    schema::db,
    stmt::{self, Value as CoreValue},
    Error, Result,
};

/// A statement parameter bound through `tokio-postgres`.
#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>>
    where
        Self: Sized,
    {
        match &self.0 {
            stmt::Value::Null => Ok(IsNull::Yes),
            stmt::Value::Bool(value) if *ty == Type::BOOL => value.to_sql(ty, out),
            stmt::Value::I64(value) => match *ty {
                Type::INT2 => i16::try_from(*value)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*value)?.to_sql(ty, out),
                Type::INT8 => value.to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
            stmt::Value::String(value) if <String as ToSql>::accepts(ty) => value.to_sql(ty, out),
            value => Err(mismatch(value, ty)),
        }
    }

    accepts!(BOOL, INT2, INT4, INT8, TEXT, VARCHAR, BPCHAR, NAME, UNKNOWN);

    to_sql_checked!();
}

fn mismatch(value: &CoreValue, ty: &Type) -> Box<dyn std::error::Error + Sync + Send> {
    anyhow::anyhow!("cannot bind {value} to a parameter of type {ty}").into()
}

/// Reads column `index` of `row`, whose schema type is `ty`.
pub(crate) fn from_row(row: &Row, index: usize, ty: &db::Type) -> Result<CoreValue> {
    let value = match ty {
        db::Type::Boolean => row.try_get::<_, Option<bool>>(index).map(CoreValue::from),
        db::Type::Integer(n) if *n <= 2 => row
            .try_get::<_, Option<i16>>(index)
            .map(|v| CoreValue::from(v.map(i64::from))),
        db::Type::Integer(n) if *n <= 4 => row
            .try_get::<_, Option<i32>>(index)
            .map(|v| CoreValue::from(v.map(i64::from))),
        db::Type::Integer(_) => row.try_get::<_, Option<i64>>(index).map(CoreValue::from),
        db::Type::Text | db::Type::VarChar(_) => {
            row.try_get::<_, Option<String>>(index).map(CoreValue::from)
        }
        db::Type::Numeric => {
            return Err(strata_core::err!(
                "reading NUMERIC columns is not supported; column={}",
                row.columns()[index].name()
            ))
        }
    };

    value.map_err(Error::driver)
}
