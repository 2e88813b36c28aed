/// DDL for the entity tables, in foreign-key order.
pub const CREATE_TABLES: [&str; 7] = [
    r#"
    create table metric (
      id        integer not null primary key,
      name      varchar(25) not null,
      data_type varchar(6) not null
    )
    "#,
    r#"
    create table wt_attribute (
      id             integer not null primary key,
      metric         integer not null references metric (id),
      is_pivot       boolean not null default false,
      window_type    varchar(4) not null,
      window_size    varchar(1) not null,
      aggr_fun       varchar(3) not null,
      aggr_data_type varchar(6) not null
    )
    "#,
    r#"
    create table constant (
      id        integer not null primary key,
      value     varchar(50) not null,
      data_type varchar(6) not null
    )
    "#,
    r#"
    create table predicate (
      id           integer not null primary key,
      wt_attribute integer not null references wt_attribute (id),
      operator     varchar(4) not null,
      constant     integer not null references constant (id)
    )
    "#,
    r#"
    create table campaign (
      id                     integer not null primary key,
      valid_from             bigint not null,
      valid_to               bigint not null,
      firing_interval        varchar(2) not null,
      firing_start_condition varchar(7) not null
    )
    "#,
    r#"
    create table conjunct (
      id       integer not null primary key,
      campaign integer not null references campaign (id)
    )
    "#,
    r#"
    create table conjunct_predicate (
      predicate integer not null references predicate (id),
      conjunct  integer not null references conjunct (id),
      primary key (predicate, conjunct)
    )
    "#,
];

/// Tables in reverse foreign-key order, for teardown.
pub const DROP_ORDER: [&str; 7] = [
    "conjunct_predicate",
    "conjunct",
    "campaign",
    "predicate",
    "constant",
    "wt_attribute",
    "metric",
];
