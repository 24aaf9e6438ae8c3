use super::*;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_calc_field_double() {
    let temp = TempDir::new().unwrap();
    let table = write_csv(&temp, "adm.csv", "id,pop\n1,100\n2,\n3,2.5\n");

    let op = TableOperation::CalcField {
        table_file: table.clone(),
        new_field: "pop_half".to_string(),
        source_field: "POP".to_string(),
        multiplier: 0.5,
        field_type: FieldType::Double,
    };
    let summary = op.apply().unwrap();

    assert_eq!(summary.rows, Some(3));
    assert_eq!(read(&table), "id,pop,pop_half\n1,100,50.0\n2,,\n3,2.5,1.25\n");
}

#[test]
fn test_calc_field_long_truncates() {
    let temp = TempDir::new().unwrap();
    let table = write_csv(&temp, "adm.csv", "id,pop\n1,100\n2,2.5\n3,-2.5\n");

    TableOperation::CalcField {
        table_file: table.clone(),
        new_field: "pop_half".to_string(),
        source_field: "pop".to_string(),
        multiplier: 0.5,
        field_type: "LONG".parse().unwrap(),
    }
    .apply()
    .unwrap();

    assert_eq!(read(&table), "id,pop,pop_half\n1,100,50\n2,2.5,1\n3,-2.5,-1\n");
}

#[test]
fn test_calc_field_missing_column() {
    let temp = TempDir::new().unwrap();
    let table = write_csv(&temp, "adm.csv", "id,pop\n1,100\n");

    let err = TableOperation::CalcField {
        table_file: table,
        new_field: "x".to_string(),
        source_field: "area".to_string(),
        multiplier: 1.0,
        field_type: FieldType::Double,
    }
    .apply()
    .unwrap_err();
    assert!(matches!(err, TableError::MissingColumn { ref column, .. } if column == "area"));
}

#[test]
fn test_calc_field_rejects_text_cells() {
    let temp = TempDir::new().unwrap();
    let table = write_csv(&temp, "adm.csv", "id,pop\n1,many\n");

    let err = TableOperation::CalcField {
        table_file: table,
        new_field: "x".to_string(),
        source_field: "pop".to_string(),
        multiplier: 1.0,
        field_type: FieldType::Double,
    }
    .apply()
    .unwrap_err();
    assert!(matches!(err, TableError::NotANumber { .. }));
}

#[test]
fn test_non_csv_left_untouched() {
    let temp = TempDir::new().unwrap();
    let table = write_csv(&temp, "adm.dbf", "binary");

    let summary = TableOperation::AddField {
        table_file: table.clone(),
        new_field: "date".to_string(),
        value: "2016-01".to_string(),
    }
    .apply()
    .unwrap();
    assert_eq!(summary.rows, None);
    assert_eq!(read(&table), "binary");
}

#[test]
fn test_add_field() {
    let temp = TempDir::new().unwrap();
    let table = write_csv(&temp, "adm.csv", "id\n1\n2\n");

    TableOperation::AddField {
        table_file: table.clone(),
        new_field: "start_date".to_string(),
        value: "2016-01-01".to_string(),
    }
    .apply()
    .unwrap();
    assert_eq!(read(&table), "id,start_date\n1,2016-01-01\n2,2016-01-01\n");
}

#[test]
fn test_choropleth() {
    let temp = TempDir::new().unwrap();
    let input = write_csv(
        &temp,
        "impact.csv",
        "adm_code,affected,start,end,extra\nX,12,2016-01-01,2016-01-31,z\n",
    );
    let output = temp.path().join("map.csv");

    TableOperation::Choropleth {
        input_file: input,
        output_file: output.clone(),
        area_field: "adm_code".to_string(),
        value_field: "affected".to_string(),
        start_date_field: "start".to_string(),
        end_date_field: "end".to_string(),
    }
    .apply()
    .unwrap();
    assert_eq!(
        read(&output),
        "area_id,value,start_date,end_date\nX,12,2016-01-01,2016-01-31\n"
    );
}

#[test]
fn test_merge_on_shared_key() {
    let temp = TempDir::new().unwrap();
    let first = write_csv(&temp, "a.csv", "code,name\n1,A\n2,B\n3,C\n");
    let second = write_csv(&temp, "b.csv", "code,pop\n1,10\n3,30\n3,31\n");
    let output = temp.path().join("merged.csv");

    let summary = TableOperation::Merge {
        first_file: first,
        second_file: second,
        output_file: output.clone(),
        first_field: "code".to_string(),
        second_field: "code".to_string(),
    }
    .apply()
    .unwrap();

    assert_eq!(summary.rows, Some(3));
    assert_eq!(read(&output), "code,name,pop\n1,A,10\n3,C,30\n3,C,31\n");
}

#[test]
fn test_merge_suffixes_clashing_columns() {
    let temp = TempDir::new().unwrap();
    let first = write_csv(&temp, "a.csv", "adm,value\nX,1\n");
    let second = write_csv(&temp, "b.csv", "id,value\nX,2\n");
    let output = temp.path().join("merged.csv");

    TableOperation::Merge {
        first_file: first,
        second_file: second,
        output_file: output.clone(),
        first_field: "adm".to_string(),
        second_field: "id".to_string(),
    }
    .apply()
    .unwrap();
    assert_eq!(read(&output), "adm,value_x,id,value_y\nX,1,X,2\n");
}

#[test]
fn test_aggregate_with_all_fields() {
    let temp = TempDir::new().unwrap();
    let input = write_csv(
        &temp,
        "districts.csv",
        "region,district,pop,area\nB,d1,10,1\nA,d2,5,2\nB,d3,20,3\n",
    );
    let output = temp.path().join("regions.csv");

    TableOperation::Aggregate {
        input_file: input,
        output_file: output.clone(),
        group_field: "region".to_string(),
        functions: BTreeMap::from([
            ("pop".to_string(), AggregateFn::Sum),
            ("area".to_string(), AggregateFn::Max),
        ]),
        all_fields: true,
    }
    .apply()
    .unwrap();
    assert_eq!(
        read(&output),
        "region,district,pop,area\nA,d2,5,2\nB,d1,30,3\n"
    );
}

#[test]
fn test_aggregate_listed_fields_only() {
    let temp = TempDir::new().unwrap();
    let input = write_csv(
        &temp,
        "districts.csv",
        "code,district,pop\n10,d1,4\n9,d2,5\n10,d3,\n",
    );
    let output = temp.path().join("codes.csv");

    TableOperation::Aggregate {
        input_file: input,
        output_file: output.clone(),
        group_field: "code".to_string(),
        functions: BTreeMap::from([("pop".to_string(), "avg".parse().unwrap())]),
        all_fields: false,
    }
    .apply()
    .unwrap();
    assert_eq!(read(&output), "code,pop\n9,5\n10,4\n");
}

#[test]
fn test_aggregate_function_names() {
    assert_eq!("COUNT".parse::<AggregateFn>(), Ok(AggregateFn::Count));
    assert!("median".parse::<AggregateFn>().is_err());
    assert_eq!("float".parse::<FieldType>(), Ok(FieldType::Double));
}
