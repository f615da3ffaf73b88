use clap::ValueEnum;
use datamapper_sql::prelude::*;

#[test]
fn every_backend_rejects_calls_before_connect() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let registry = AdapterRegistry::with_defaults();
        let ctx = CallContext::background();
        let op = Operation::new("users")
            .property("Name", "name")
            .identifier("ID", "id");

        for kind in BackendKind::value_variants() {
            let adapter = registry.create(kind.name()).expect("registered");
            assert_eq!(adapter.name(), kind.name());

            // Repeated calls fail the same way.
            for _ in 0..2 {
                let err = adapter.fetch(&ctx, &op, &Params::new()).await.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::NotConnected);

                let mut objects = vec![Record::new().with("Name", "x")];
                let err = adapter.insert(&ctx, &op, &mut objects).await.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::NotConnected);
                assert!(objects[0].get("ID").is_none());

                let err = adapter.update(&ctx, &op, &[]).await.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::NotConnected);

                let err = adapter
                    .delete(&ctx, &op, &[Identifier::from(1_i64)])
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::NotConnected);

                let err = adapter
                    .execute(&ctx, &Action::new("SELECT 1"), &Params::new())
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::NotConnected);
            }
        }
        Ok::<(), SqlAdapterError>(())
    })?;
    Ok(())
}
