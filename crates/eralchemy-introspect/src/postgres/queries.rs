use sqlx::PgPool;

use eralchemy_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn fetch_database_name(pool: &PgPool) -> Result<String> {
    sqlx::query_scalar::<_, String>("select current_database()::text")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn list_schemas(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select nspname::text
        from pg_namespace
        order by nspname
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub struct RawTable {
    pub name: String,
    pub relkind: i8,
    pub comment: Option<String>,
}

pub async fn list_tables_in_schema(pool: &PgPool, schema: &str) -> Result<Vec<RawTable>> {
    let rows = sqlx::query_as::<_, (String, i8, Option<String>)>(
        r#"
        select
          c.relname::text,
          c.relkind,
          pg_catalog.obj_description(c.oid, 'pg_class')
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind in ('r','p','v','m','f')
        order by c.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(name, relkind, comment)| RawTable {
            name,
            relkind,
            comment,
        })
        .collect())
}

pub struct RawColumn {
    pub ordinal_position: i16,
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
}

pub async fn list_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<RawColumn>> {
    let rows = sqlx::query_as::<_, (i16, String, String, bool, Option<String>, Option<String>)>(
        r#"
        select
          a.attnum,
          a.attname::text,
          pg_catalog.format_type(a.atttypid, a.atttypmod),
          (not a.attnotnull),
          pg_get_expr(ad.adbin, ad.adrelid),
          pg_catalog.col_description(a.attrelid, a.attnum)
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(
            |(ordinal_position, name, data_type, is_nullable, default, comment)| RawColumn {
                ordinal_position,
                name,
                data_type,
                is_nullable,
                default,
                comment,
            },
        )
        .collect())
}

pub struct RawPrimaryKey {
    pub name: String,
    pub columns: Vec<String>,
}

pub async fn get_primary_key(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Option<RawPrimaryKey>> {
    let row = sqlx::query_as::<_, (String, Vec<String>)>(
        r#"
        select
          con.conname::text,
          array_agg(att.attname::text order by ord.ordinality)
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = rel.oid and att.attnum = ord.attnum
        where nsp.nspname = $1
          and rel.relname = $2
          and con.contype = 'p'
        group by con.conname
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?;

    Ok(row.map(|(name, columns)| RawPrimaryKey { name, columns }))
}

pub struct RawForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

pub async fn list_foreign_keys(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawForeignKey>> {
    // Source and target keys are unnested together so composite keys keep their pairing.
    let rows = sqlx::query_as::<_, (String, Vec<String>, String, String, Vec<String>)>(
        r#"
        select
          con.conname::text,
          array_agg(src_att.attname::text order by k.ordinality),
          ref_nsp.nspname::text,
          ref_rel.relname::text,
          array_agg(ref_att.attname::text order by k.ordinality)
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
        join unnest(con.conkey, con.confkey) with ordinality as k(src_attnum, ref_attnum, ordinality) on true
        join pg_attribute src_att on src_att.attrelid = src_rel.oid and src_att.attnum = k.src_attnum
        join pg_attribute ref_att on ref_att.attrelid = ref_rel.oid and ref_att.attnum = k.ref_attnum
        where src_nsp.nspname = $1
          and src_rel.relname = $2
          and con.contype = 'f'
        group by con.conname, ref_nsp.nspname, ref_rel.relname
        order by con.conname
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(
            |(name, columns, referenced_schema, referenced_table, referenced_columns)| {
                RawForeignKey {
                    name,
                    columns,
                    referenced_schema,
                    referenced_table,
                    referenced_columns,
                }
            },
        )
        .collect())
}
