#![allow(dead_code)]

use oxide_queryfier::{Parameter, Queryfied, Queryfier};

pub const TWO_CLAUSES: &str = "SELECT * FROM t WHERE a = :x AND b = :y";

pub const REAL_QUERY: &str = "SELECT ua_cd,replace(ua_nm,'RFB','') FROM uas_srf,\
    (SELECT ygua_ua_cd, max(ygua_dt_max) dt_max FROM v_gerencial_uas \
    WHERE ygua_ua_cd BETWEEN :idUaInicio AND :idUaFim AND ygua_tafi_cd = :idAtividade \
    GROUP BY ygua_ua_cd) WHERE ua_cd = ygua_ua_cd (+) \
    AND ua_cd BETWEEN :idUaInicio AND :idUaFim \
    AND (ua_nm_mnemonico IN ('DRF','SRRF','DEINF','DEAIN','DEMAC','DEFIS')) \
    AND (ua_dt_extincao IS NULL OR :dataInicial <= dt_max) AND ua_b_in_delecao_logica = 'N' \
    ORDER BY 1";

/// Builds `sql` with no bindings at all.
pub fn build_unbound(sql: &str) -> Queryfied {
    Queryfier::new(sql).build()
}

/// Names of the retained parameters, in order.
pub fn retained_names(query: &Queryfied) -> Vec<&str> {
    query.parameters().iter().map(Parameter::name).collect()
}

/// Asserts that building `sql` with `bind` applied yields `expected`.
pub fn assert_pruned(sql: &str, bind: impl FnOnce(Queryfier) -> Queryfier, expected: &str) {
    let built = bind(Queryfier::new(sql)).build();
    assert_eq!(
        built.sql(),
        expected,
        "Pruning mismatch.\n  Input:    {sql}\n  Expected: {expected}\n  Got:      {}",
        built.sql()
    );
}
